//! `char` recovery for `String.indexOf` literals.
//!
//! `s.indexOf('A')` compiles to `bipush 65` followed by a call to `indexOf(I)I`: the JVM has
//! no char constant, and the overload takes an `int` code point. Only the call site tells that
//! the integer was a character, so literals passed as the first argument of
//! `indexOf`/`lastIndexOf` are retagged to print as `char`.

use crate::{
    classfile::descriptor::STRING_CLASS,
    instruction::{Instruction, InstructionKind, MethodBody},
    normalizer::{walk, DiagnosticCategory, EventKind, PassContext, TreePass},
    Result,
};

/// Overloads whose first argument is a character.
const CHAR_OVERLOADS: [(&str, &str); 4] = [
    ("indexOf", "(I)I"),
    ("indexOf", "(II)I"),
    ("lastIndexOf", "(I)I"),
    ("lastIndexOf", "(II)I"),
];

/// Pass retagging character literals of `String.indexOf` calls.
pub struct IndexOfPass;

impl Default for IndexOfPass {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexOfPass {
    /// Creates a new indexOf typing pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit(&self, node: &mut Instruction, method: &str, ctx: &PassContext) -> bool {
        let InstructionKind::InvokeVirtual { index, args, .. } = &mut node.kind else {
            return false;
        };
        let Ok(member) = ctx.pool().member_ref(*index) else {
            return false;
        };
        if member.class_name != STRING_CLASS
            || !CHAR_OVERLOADS
                .iter()
                .any(|&(name, desc)| member.name == name && member.descriptor == desc)
        {
            return false;
        }

        let Some(first) = args.first_mut() else {
            return false;
        };
        let InstructionKind::IConst { signature, value } = &mut first.kind else {
            return false;
        };
        // Negative values are not characters; they stay `int`.
        if !matches!(signature.as_str(), "B" | "S") || *value < 0 {
            return false;
        }
        *signature = "C".to_string();

        ctx.events
            .record(EventKind::ConstantRetyped)
            .at(first.offset)
            .method(method)
            .message(format!("{} literal as char", member.name))
            .pass(self.name());
        true
    }
}

impl TreePass for IndexOfPass {
    fn name(&self) -> &'static str {
        "index-of"
    }

    fn category(&self) -> DiagnosticCategory {
        DiagnosticCategory::IndexOf
    }

    fn run_on_method(&self, method: &mut MethodBody, ctx: &PassContext) -> Result<bool> {
        let MethodBody {
            name, statements, ..
        } = method;
        let name = name.as_str();
        walk::post_order(statements, ctx, self.category(), &mut |node| {
            Ok(self.visit(node, name, ctx))
        })
    }

    fn description(&self) -> &'static str {
        "Retypes character literals passed to String.indexOf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::factories::{
        classfile::{create_context, create_pool},
        instruction::{iconst, iload, ldc_string, node},
    };

    fn run(class: &str, name: &str, desc: &str, args: Vec<Instruction>) -> (bool, MethodBody) {
        let pool = create_pool();
        let index = pool.intern_methodref(class, name, desc).unwrap();
        let receiver = ldc_string(&pool, "abc");
        let call = node(InstructionKind::InvokeVirtual {
            index,
            objectref: Box::new(receiver),
            args,
        });
        let mut method = MethodBody::new("run", "()V").with_statement(node(InstructionKind::Pop {
            value: Box::new(call),
        }));

        let ctx = create_context(pool);
        let changed = IndexOfPass::new().run_on_method(&mut method, &ctx).unwrap();
        (changed, method)
    }

    fn first_arg(method: &MethodBody) -> &InstructionKind {
        let InstructionKind::Pop { value } = &method.statements[0].kind else {
            panic!("expected pop");
        };
        let InstructionKind::InvokeVirtual { args, .. } = &value.kind else {
            panic!("expected invokevirtual");
        };
        &args[0].kind
    }

    #[test]
    fn test_index_of_literal_becomes_char() {
        let (changed, method) = run(STRING_CLASS, "indexOf", "(I)I", vec![iconst("B", 65)]);
        assert!(changed);
        assert!(matches!(
            first_arg(&method),
            InstructionKind::IConst { signature, value: 65 } if signature == "C"
        ));
    }

    #[test]
    fn test_last_index_of_with_start() {
        let (changed, method) = run(
            STRING_CLASS,
            "lastIndexOf",
            "(II)I",
            vec![iconst("S", 0x263A), iload(2)],
        );
        assert!(changed);
        assert!(matches!(
            first_arg(&method),
            InstructionKind::IConst { signature, .. } if signature == "C"
        ));
    }

    #[test]
    fn test_string_overload_untouched() {
        let (changed, _) = run(
            STRING_CLASS,
            "indexOf",
            "(Ljava/lang/String;)I",
            vec![iconst("B", 65)],
        );
        assert!(!changed);
    }

    #[test]
    fn test_other_class_untouched() {
        let (changed, _) = run("java/util/List", "indexOf", "(I)I", vec![iconst("B", 65)]);
        assert!(!changed);
    }

    #[test]
    fn test_int_and_negative_literals_untouched() {
        let (changed, _) = run(STRING_CLASS, "indexOf", "(I)I", vec![iconst("I", 65)]);
        assert!(!changed);
        let (changed, _) = run(STRING_CLASS, "indexOf", "(I)I", vec![iconst("B", -1)]);
        assert!(!changed);
    }
}
