//! Pretty-printing for IR
//!
//! Provides human-readable output for debugging assembled trees.

use super::node::{Artifact, Node};
use std::fmt::Write;

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Artifact {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p, p.ty))
            .collect();
        writeln!(
            output,
            "fn {}({}) -> {} {{",
            self.name,
            params.join(", "),
            self.return_type
        )
        .unwrap();
        write_node(&mut output, &self.body, 1);
        writeln!(output, "}}").unwrap();
        output
    }
}

impl PrettyPrint for Node {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        write_node(&mut output, self, 0);
        output
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let pad = "  ".repeat(depth);
    match node {
        Node::Nop => writeln!(out, "{}nop", pad).unwrap(),
        Node::Eval(expr) => writeln!(out, "{}{}", pad, expr).unwrap(),
        Node::Assign { target, value } => writeln!(out, "{}{} = {}", pad, target, value).unwrap(),
        Node::Block { locals, body } => {
            if locals.is_empty() {
                writeln!(out, "{}block {{", pad).unwrap();
            } else {
                let locals: Vec<String> = locals
                    .iter()
                    .map(|l| format!("{}: {}", l, l.ty))
                    .collect();
                writeln!(out, "{}block [{}] {{", pad, locals.join(", ")).unwrap();
            }
            for stmt in body {
                write_node(out, stmt, depth + 1);
            }
            writeln!(out, "{}}}", pad).unwrap();
        }
        Node::If {
            test,
            then_branch,
            else_branch,
        } => {
            writeln!(out, "{}if {} {{", pad, test).unwrap();
            write_node(out, then_branch, depth + 1);
            if !else_branch.is_nop() {
                writeln!(out, "{}}} else {{", pad).unwrap();
                write_node(out, else_branch, depth + 1);
            }
            writeln!(out, "{}}}", pad).unwrap();
        }
        Node::Loop {
            body,
            break_label,
            continue_label,
        } => {
            writeln!(
                out,
                "{}loop break={} continue={} {{",
                pad, break_label, continue_label
            )
            .unwrap();
            write_node(out, body, depth + 1);
            writeln!(out, "{}}}", pad).unwrap();
        }
        Node::Label { target, default } => match default {
            Some(value) => writeln!(out, "{}{}: (default {})", pad, target, value).unwrap(),
            None => writeln!(out, "{}{}:", pad, target).unwrap(),
        },
        Node::Goto { target, value } => match value {
            Some(value) => writeln!(out, "{}goto {} with {}", pad, target, value).unwrap(),
            None => writeln!(out, "{}goto {}", pad, target).unwrap(),
        },
        Node::Switch {
            value,
            cases,
            default,
        } => {
            writeln!(out, "{}switch {} {{", pad, value).unwrap();
            for case in cases {
                let values: Vec<String> = case.values.iter().map(|v| format!("{}", v)).collect();
                writeln!(out, "{}  case {}:", pad, values.join(", ")).unwrap();
                write_node(out, &case.body, depth + 2);
            }
            if let Some(default) = default {
                writeln!(out, "{}  default:", pad).unwrap();
                write_node(out, default, depth + 2);
            }
            writeln!(out, "{}}}", pad).unwrap();
        }
        Node::Try {
            body,
            handlers,
            finally,
        } => {
            writeln!(out, "{}try {{", pad).unwrap();
            write_node(out, body, depth + 1);
            for handler in handlers {
                match &handler.binding {
                    Some(binding) => {
                        writeln!(out, "{}}} catch {} {} {{", pad, handler.kind, binding).unwrap()
                    }
                    None => writeln!(out, "{}}} catch {} {{", pad, handler.kind).unwrap(),
                }
                write_node(out, &handler.body, depth + 1);
            }
            if let Some(finally) = finally {
                writeln!(out, "{}}} finally {{", pad).unwrap();
                write_node(out, finally, depth + 1);
            }
            writeln!(out, "{}}}", pad).unwrap();
        }
        Node::Throw(value) => writeln!(out, "{}throw {}", pad, value).unwrap(),
        Node::Rethrow => writeln!(out, "{}rethrow", pad).unwrap(),
    }
}
