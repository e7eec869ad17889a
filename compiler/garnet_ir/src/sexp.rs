//! S-expression rendering of a tree.
//!
//! Used by tests and debugging output. The format is stable: one
//! parenthesised form per node, `nil` for absent children.

use super::ast::{CallOp, ConstScope, GuardKind, NodeId, NodeKind};
use super::{Name, NodeArena, NumericValue, StringLookup};
use std::fmt::Write;

/// Render the subtree rooted at `root`.
pub fn to_sexp(arena: &NodeArena, root: NodeId, names: &dyn StringLookup) -> String {
    let mut printer = Printer {
        arena,
        names,
        out: String::new(),
    };
    printer.node(root);
    printer.out
}

struct Printer<'a> {
    arena: &'a NodeArena,
    names: &'a dyn StringLookup,
    out: String,
}

impl Printer<'_> {
    fn open(&mut self, tag: &str) {
        self.out.push('(');
        self.out.push_str(tag);
    }

    fn close(&mut self) {
        self.out.push(')');
    }

    fn name(&mut self, name: Name) {
        self.out.push(' ');
        let text = self.names.lookup(name);
        self.out.push_str(text);
    }

    fn word(&mut self, word: &str) {
        self.out.push(' ');
        self.out.push_str(word);
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.out.push_str(" \"");
        for &b in bytes {
            match b {
                b'"' => self.out.push_str("\\\""),
                b'\\' => self.out.push_str("\\\\"),
                b'\n' => self.out.push_str("\\n"),
                b'\t' => self.out.push_str("\\t"),
                0x20..=0x7e => self.out.push(char::from(b)),
                _ => {
                    let _ = write!(self.out, "\\x{b:02X}");
                }
            }
        }
        self.out.push('"');
    }

    fn child(&mut self, id: NodeId) {
        self.out.push(' ');
        self.node(id);
    }

    fn opt(&mut self, id: Option<NodeId>) {
        match id {
            Some(id) => self.child(id),
            None => self.word("nil"),
        }
    }

    fn list(&mut self, ids: &[NodeId]) {
        for &id in ids {
            self.child(id);
        }
    }

    fn simple(&mut self, tag: &str, children: &[NodeId]) {
        self.open(tag);
        self.list(children);
        self.close();
    }

    fn named(&mut self, tag: &str, name: Name, value: Option<NodeId>) {
        self.open(tag);
        self.name(name);
        if let Some(value) = value {
            self.child(value);
        }
        self.close();
    }

    fn opt_name(&mut self, tag: &str, name: Option<Name>) {
        self.open(tag);
        if let Some(name) = name {
            self.name(name);
        }
        self.close();
    }

    fn scope(&mut self, scope: ConstScope) {
        match scope {
            ConstScope::Lexical => {}
            ConstScope::TopLevel => self.word("::"),
            ConstScope::Scoped(id) => self.child(id),
        }
    }

    fn number(&mut self, value: &NumericValue) {
        let tag = match value {
            NumericValue::Integer(_) | NumericValue::BigInteger { .. } => "int",
            NumericValue::Float(_) => "float",
            NumericValue::Rational { .. } => "rational",
            NumericValue::Imaginary(_) => "imaginary",
        };
        self.open(tag);
        self.word(&value.to_string());
        self.close();
    }

    fn node(&mut self, id: NodeId) {
        let arena = self.arena;
        match &arena.get(id).kind {
            NodeKind::Nil => self.out.push_str("(nil)"),
            NodeKind::True => self.out.push_str("(true)"),
            NodeKind::False => self.out.push_str("(false)"),
            NodeKind::SelfRef => self.out.push_str("(self)"),
            NodeKind::File => self.out.push_str("(__FILE__)"),
            NodeKind::Encoding => self.out.push_str("(__ENCODING__)"),
            NodeKind::Line(line) => {
                let _ = write!(self.out, "(__LINE__ {line})");
            }
            NodeKind::Numeric(value) => self.number(value),
            NodeKind::Str { value, frozen } => {
                self.open("str");
                self.bytes(value);
                if *frozen {
                    self.word("frozen");
                }
                self.close();
            }
            NodeKind::XStr { value } => {
                self.open("xstr");
                self.bytes(value);
                self.close();
            }
            NodeKind::DStr { parts } => self.simple("dstr", parts),
            NodeKind::DXStr { parts } => self.simple("dxstr", parts),
            NodeKind::DSym { parts } => self.simple("dsym", parts),
            NodeKind::Sym(name) => self.named("sym", *name, None),
            NodeKind::Regex { source, options } => {
                self.open("regex");
                self.bytes(source);
                if !options.is_empty() {
                    self.word(&options.letters());
                }
                self.close();
            }
            NodeKind::DRegex { parts, options } => {
                self.open("dregex");
                self.list(parts);
                if !options.is_empty() {
                    self.word(&options.letters());
                }
                self.close();
            }
            NodeKind::EvStr { body } => {
                self.open("evstr");
                self.opt(*body);
                self.close();
            }
            NodeKind::Array { elements } => self.simple("array", elements),
            NodeKind::Hash { pairs, .. } => self.simple("hash", pairs),
            NodeKind::Pair { key, value } => self.simple("pair", &[*key, *value]),
            NodeKind::Range {
                low,
                high,
                exclusive,
            } => {
                self.open(if *exclusive { "erange" } else { "irange" });
                self.opt(*low);
                self.opt(*high);
                self.close();
            }
            NodeKind::LocalVar(name) => self.named("lvar", *name, None),
            NodeKind::IVar(name) => self.named("ivar", *name, None),
            NodeKind::CVar(name) => self.named("cvar", *name, None),
            NodeKind::GVar(name) => self.named("gvar", *name, None),
            NodeKind::NthRef(n) => {
                let _ = write!(self.out, "(nth_ref {n})");
            }
            NodeKind::BackRef(c) => {
                let _ = write!(self.out, "(back_ref ${})", char::from(*c));
            }
            NodeKind::Const { scope, name } => {
                self.open("const");
                self.scope(*scope);
                self.name(*name);
                self.close();
            }
            NodeKind::LocalAsgn { name, value } => self.named("lasgn", *name, *value),
            NodeKind::IVarAsgn { name, value } => self.named("iasgn", *name, *value),
            NodeKind::CVarAsgn { name, value } => self.named("cvasgn", *name, *value),
            NodeKind::GVarAsgn { name, value } => self.named("gasgn", *name, *value),
            NodeKind::ConstAsgn { scope, name, value } => {
                self.open("casgn");
                self.scope(*scope);
                self.name(*name);
                if let Some(value) = value {
                    self.child(*value);
                }
                self.close();
            }
            NodeKind::AttrAsgn {
                receiver,
                name,
                args,
                op,
            } => {
                self.open(if *op == CallOp::SafeNav {
                    "safe_attrasgn"
                } else {
                    "attrasgn"
                });
                self.child(*receiver);
                self.name(*name);
                self.list(args);
                self.close();
            }
            NodeKind::MultiAsgn { targets, value } => self.simple("masgn", &[*targets, *value]),
            NodeKind::Mlhs { items } => self.simple("mlhs", items),
            NodeKind::OpAsgn { target, op, value } => {
                self.open("op_asgn");
                self.child(*target);
                self.name(*op);
                self.child(*value);
                self.close();
            }
            NodeKind::OrAsgn { target, value } => self.simple("or_asgn", &[*target, *value]),
            NodeKind::AndAsgn { target, value } => self.simple("and_asgn", &[*target, *value]),
            NodeKind::Splat { value } => {
                self.open("splat");
                if let Some(value) = value {
                    self.child(*value);
                }
                self.close();
            }
            NodeKind::DoubleSplat { value } => {
                self.open("kwsplat");
                if let Some(value) = value {
                    self.child(*value);
                }
                self.close();
            }
            NodeKind::Call {
                receiver,
                name,
                args,
                block,
                op,
            } => {
                self.open(match op {
                    CallOp::SafeNav => "csend",
                    CallOp::Dot | CallOp::Colon2 => "call",
                });
                self.opt(*receiver);
                self.name(*name);
                self.list(args);
                if let Some(block) = block {
                    self.child(*block);
                }
                self.close();
            }
            NodeKind::VCall(name) => self.named("vcall", *name, None),
            NodeKind::BlockPass { value } => {
                self.open("block_pass");
                if let Some(value) = value {
                    self.child(*value);
                }
                self.close();
            }
            NodeKind::ForwardedArgs => self.out.push_str("(forwarded_args)"),
            NodeKind::Block {
                params,
                body,
                numbered,
            }
            | NodeKind::Lambda {
                params,
                body,
                numbered,
            } => {
                let is_lambda = matches!(arena.get(id).kind, NodeKind::Lambda { .. });
                self.open(if is_lambda { "lambda" } else { "block" });
                if *numbered > 0 {
                    let _ = write!(self.out, " (numparams {numbered})");
                } else {
                    self.opt(*params);
                }
                self.opt(*body);
                self.close();
            }
            NodeKind::Super { args, block } => {
                self.open("super");
                self.list(args);
                if let Some(block) = block {
                    self.child(*block);
                }
                self.close();
            }
            NodeKind::ZSuper { block } => {
                self.open("zsuper");
                if let Some(block) = block {
                    self.child(*block);
                }
                self.close();
            }
            NodeKind::Yield { args } => self.simple("yield", args),
            NodeKind::Defined(value) => self.simple("defined", &[*value]),
            NodeKind::And { left, right } => self.simple("and", &[*left, *right]),
            NodeKind::Or { left, right } => self.simple("or", &[*left, *right]),
            NodeKind::Not(value) => self.simple("not", &[*value]),
            NodeKind::MatchWithLvasgn {
                regex,
                value,
                names,
            } => {
                self.open("match_with_lvasgn");
                self.child(*regex);
                self.child(*value);
                for name in names {
                    self.name(*name);
                }
                self.close();
            }
            NodeKind::Params {
                required,
                optional,
                rest,
                post,
                keywords,
                kwrest,
                block,
                block_locals,
            } => {
                self.open("params");
                self.list(required);
                self.list(optional);
                if let Some(rest) = rest {
                    self.child(*rest);
                }
                self.list(post);
                self.list(keywords);
                if let Some(kwrest) = kwrest {
                    self.child(*kwrest);
                }
                if let Some(block) = block {
                    self.child(*block);
                }
                self.list(block_locals);
                self.close();
            }
            NodeKind::UnorderedParams(params) => self.simple("params", params),
            NodeKind::Arg(name) => self.named("arg", *name, None),
            NodeKind::OptArg { name, default } => self.named("optarg", *name, Some(*default)),
            NodeKind::RestArg(name) => self.opt_name("restarg", *name),
            NodeKind::KwArg { name, default } => {
                self.named(if default.is_some() { "kwoptarg" } else { "kwarg" }, *name, *default);
            }
            NodeKind::KwRestArg(name) => self.opt_name("kwrestarg", *name),
            NodeKind::NoKwArg => self.out.push_str("(kwnilarg)"),
            NodeKind::BlockArg(name) => self.opt_name("blockarg", *name),
            NodeKind::ForwardArg => self.out.push_str("(forward_arg)"),
            NodeKind::MlhsArg { items } => self.simple("mlhs", items),
            NodeKind::ShadowArg(name) => self.named("shadowarg", *name, None),
            NodeKind::Stmts(stmts) => self.simple("stmts", stmts),
            NodeKind::Begin { body } => {
                self.open("begin");
                if let Some(body) = body {
                    self.child(*body);
                }
                self.close();
            }
            NodeKind::If {
                cond,
                then_body,
                else_body,
            } => {
                self.open("if");
                self.child(*cond);
                self.opt(*then_body);
                self.opt(*else_body);
                self.close();
            }
            NodeKind::While {
                cond,
                body,
                do_while,
            } => {
                self.open(if *do_while { "while_post" } else { "while" });
                self.child(*cond);
                self.opt(*body);
                self.close();
            }
            NodeKind::Until {
                cond,
                body,
                do_while,
            } => {
                self.open(if *do_while { "until_post" } else { "until" });
                self.child(*cond);
                self.opt(*body);
                self.close();
            }
            NodeKind::For { var, iter, body } => {
                self.open("for");
                self.child(*var);
                self.child(*iter);
                self.opt(*body);
                self.close();
            }
            NodeKind::Case {
                subject,
                whens,
                else_body,
            } => {
                self.open("case");
                self.opt(*subject);
                self.list(whens);
                self.opt(*else_body);
                self.close();
            }
            NodeKind::When { conds, body } => {
                self.open("when");
                self.list(conds);
                self.opt(*body);
                self.close();
            }
            NodeKind::CaseMatch {
                subject,
                clauses,
                else_body,
            } => {
                self.open("case_match");
                self.child(*subject);
                self.list(clauses);
                self.opt(*else_body);
                self.close();
            }
            NodeKind::InClause {
                pattern,
                guard,
                body,
            } => {
                self.open("in");
                self.child(*pattern);
                match guard {
                    Some((GuardKind::If, cond)) => self.simple_child("if_guard", *cond),
                    Some((GuardKind::Unless, cond)) => self.simple_child("unless_guard", *cond),
                    None => self.word("nil"),
                }
                self.opt(*body);
                self.close();
            }
            NodeKind::MatchPattern { value, pattern } => {
                self.simple("match_pattern", &[*value, *pattern]);
            }
            NodeKind::MatchPatternP { value, pattern } => {
                self.simple("match_pattern_p", &[*value, *pattern]);
            }
            NodeKind::Rescue {
                body,
                clauses,
                else_body,
            } => {
                self.open("rescue");
                self.opt(*body);
                self.list(clauses);
                self.opt(*else_body);
                self.close();
            }
            NodeKind::RescueClause {
                exceptions,
                var,
                body,
            } => {
                self.open("resbody");
                self.out.push_str(" (");
                for (i, exc) in exceptions.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    self.node(*exc);
                }
                self.out.push(')');
                self.opt(*var);
                self.opt(*body);
                self.close();
            }
            NodeKind::Ensure { body, ensure } => {
                self.open("ensure");
                self.opt(*body);
                self.opt(*ensure);
                self.close();
            }
            NodeKind::RescueMod { body, rescue } => self.simple("rescue_mod", &[*body, *rescue]),
            NodeKind::Return(value) => self.jump("return", *value),
            NodeKind::Break(value) => self.jump("break", *value),
            NodeKind::Next(value) => self.jump("next", *value),
            NodeKind::Redo => self.out.push_str("(redo)"),
            NodeKind::Retry => self.out.push_str("(retry)"),
            NodeKind::ArrayPattern { constant, elements } => {
                self.open("array_pattern");
                self.opt(*constant);
                self.list(elements);
                self.close();
            }
            NodeKind::FindPattern {
                constant,
                pre_rest,
                elements,
                post_rest,
            } => {
                self.open("find_pattern");
                self.opt(*constant);
                self.child(*pre_rest);
                self.list(elements);
                self.child(*post_rest);
                self.close();
            }
            NodeKind::HashPattern {
                constant,
                pairs,
                rest,
            } => {
                self.open("hash_pattern");
                self.opt(*constant);
                self.list(pairs);
                if let Some(rest) = rest {
                    self.child(*rest);
                }
                self.close();
            }
            NodeKind::PatternPair { key, value } => self.named("pair", *key, *value),
            NodeKind::MatchVar(name) => self.named("match_var", *name, None),
            NodeKind::MatchRest(name) => self.opt_name("match_rest", *name),
            NodeKind::MatchNilRest => self.out.push_str("(match_nil_pattern)"),
            NodeKind::MatchAlt { left, right } => self.simple("match_alt", &[*left, *right]),
            NodeKind::MatchAs { pattern, name } => {
                self.open("match_as");
                self.child(*pattern);
                self.name(*name);
                self.close();
            }
            NodeKind::Pin(value) => self.simple("pin", &[*value]),
            NodeKind::Def {
                receiver,
                name,
                params,
                body,
                endless,
            } => {
                self.open(if receiver.is_some() { "defs" } else { "def" });
                if let Some(receiver) = receiver {
                    self.child(*receiver);
                }
                self.name(*name);
                self.opt(*params);
                self.opt(*body);
                if *endless {
                    self.word("endless");
                }
                self.close();
            }
            NodeKind::Class {
                path,
                superclass,
                body,
            } => {
                self.open("class");
                self.child(*path);
                self.opt(*superclass);
                self.opt(*body);
                self.close();
            }
            NodeKind::SClass { target, body } => {
                self.open("sclass");
                self.child(*target);
                self.opt(*body);
                self.close();
            }
            NodeKind::Module { path, body } => {
                self.open("module");
                self.child(*path);
                self.opt(*body);
                self.close();
            }
            NodeKind::Alias { new_name, old_name } => {
                self.simple("alias", &[*new_name, *old_name]);
            }
            NodeKind::Undef(names) => self.simple("undef", names),
            NodeKind::PreExe(body) => {
                self.open("preexe");
                self.opt(*body);
                self.close();
            }
            NodeKind::PostExe(body) => {
                self.open("postexe");
                self.opt(*body);
                self.close();
            }
            NodeKind::EnsureShareable(value) => self.simple("ensure_shareable", &[*value]),
            NodeKind::MakeShareable { value, copy } => {
                self.open(if *copy {
                    "make_shareable_copy"
                } else {
                    "make_shareable"
                });
                self.child(*value);
                self.close();
            }
            NodeKind::Error => self.out.push_str("(error)"),
        }
    }

    fn simple_child(&mut self, tag: &str, child: NodeId) {
        self.out.push(' ');
        self.simple(tag, &[child]);
    }

    fn jump(&mut self, tag: &str, value: Option<NodeId>) {
        self.open(tag);
        if let Some(value) = value {
            self.child(value);
        }
        self.close();
    }
}

#[cfg(test)]
mod tests;
