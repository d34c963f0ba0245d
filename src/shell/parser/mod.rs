mod ast;
mod lexer;
mod parser;

pub use ast::{Command, RedirectMode};
pub use parser::Parser;
