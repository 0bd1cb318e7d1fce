use crate::lex::token::Token;
use crate::parse::ast::Program;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub contents: String,
}

/// Artifacts the emit phase can write for each source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitKind {
    Tokens,
    Cst,
    Ast,
    Il,
}

impl EmitKind {
    pub const ALL: [EmitKind; 4] = [EmitKind::Tokens, EmitKind::Cst, EmitKind::Ast, EmitKind::Il];

    pub fn name(self) -> &'static str {
        match self {
            EmitKind::Tokens => "tokens",
            EmitKind::Cst => "cst",
            EmitKind::Ast => "ast",
            EmitKind::Il => "il",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// File suffix appended to the source stem.
    pub fn extension(self) -> &'static str {
        match self {
            EmitKind::Tokens => "tokens.json",
            EmitKind::Cst => "cst.dot",
            EmitKind::Ast => "ast.json",
            EmitKind::Il => "il",
        }
    }
}

/// Everything the front-end produced for one source file.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    pub path: String,
    pub tokens: Vec<Token>,
    pub cst_dot: String,
    pub program: Program,
    pub il: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompileResult {
    pub units: Vec<CompiledUnit>,
}

impl CompileResult {
    pub fn statement_count(&self) -> usize {
        self.units.iter().map(|u| u.program.statements.len()).sum()
    }
}
