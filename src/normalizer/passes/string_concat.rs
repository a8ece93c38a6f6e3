//! String concatenation reconstruction.
//!
//! Before Java 9, javac compiled `a + b` on strings into a builder chain:
//!
//! ```text
//! new StringBuilder().append(a).append(b).toString()
//! ```
//!
//! This pass folds such chains back into a left-nested tree of `+` nodes, so that printing it
//! left to right reproduces the append order. `StringBuffer` chains, emitted by older
//! compilers, fold the same way.
//!
//! # Matching
//!
//! A chain matches when, following the receiver of the `toString()` call backwards, every
//! call is a single-argument `append` on the same builder class returning the builder, and
//! the chain starts at a builder constructor. The constructor contributes its argument as the
//! first operand when it takes a `String` or `CharSequence`; a constant capacity argument is
//! dropped. Chains over anything else, such as a builder held in a local that may already
//! have content, are not folded. Neither are chains appending a `char[]`, whose `+` meaning
//! differs from `append`.
//!
//! # Typing
//!
//! `x + y` only concatenates when one of its operands is a `String`. When neither of the first
//! two operands has a `String` append type, the fold is prefixed with `""`; a chain of a single
//! non-`String` operand becomes `"" + x`. A leading `String.valueOf(x)` is reduced to `x` when
//! the second operand is a `String`.
//!
//! Literals appended through `append(char)` or `append(boolean)` are retagged to that type, and a
//! chain whose literal is outside the range of its append type is left alone.

use std::mem;

use crate::{
    classfile::{
        descriptor::{
            class_signature, MethodDescriptor, STRING_BUFFER_CLASS, STRING_BUILDER_CLASS,
            STRING_CLASS, STRING_SIGNATURE,
        },
        ConstantPool,
    },
    instruction::{ops::BinaryOperator, Instruction, InstructionKind, MethodBody},
    normalizer::{walk, DiagnosticCategory, EventKind, PassContext, TreePass},
    Result,
};

const CHAR_SEQUENCE_SIGNATURE: &str = "Ljava/lang/CharSequence;";

/// A matched builder chain.
#[derive(Debug)]
struct Chain {
    /// Append type of every operand, head first
    signatures: Vec<String>,
    /// Whether the constructor argument is the first operand
    constructor_operand: bool,
}

fn is_builder(class_name: &str) -> bool {
    class_name == STRING_BUILDER_CLASS || class_name == STRING_BUFFER_CLASS
}

/// Matches the builder chain ending in the `toString()` call `node`.
fn match_chain(node: &Instruction, pool: &ConstantPool) -> Option<Chain> {
    let InstructionKind::InvokeVirtual {
        index,
        objectref,
        args,
    } = &node.kind
    else {
        return None;
    };
    let terminal = pool.member_ref(*index).ok()?;
    if !args.is_empty()
        || terminal.name != "toString"
        || terminal.descriptor != "()Ljava/lang/String;"
        || !is_builder(&terminal.class_name)
    {
        return None;
    }

    let builder = terminal.class_name;
    let builder_signature = class_signature(&builder);
    let mut signatures = Vec::new();
    let mut current = objectref.as_ref();
    loop {
        match &current.kind {
            InstructionKind::InvokeVirtual {
                index,
                objectref,
                args,
            } => {
                let member = pool.member_ref(*index).ok()?;
                if member.name != "append" || member.class_name != builder || args.len() != 1 {
                    return None;
                }
                let descriptor = MethodDescriptor::parse(&member.descriptor).ok()?;
                if descriptor.return_type != builder_signature {
                    return None;
                }
                let [parameter] = <[String; 1]>::try_from(descriptor.parameters).ok()?;
                if parameter == "[C" || !literal_fits(&args[0], &parameter) {
                    return None;
                }
                signatures.push(parameter);
                current = objectref.as_ref();
            }
            InstructionKind::InvokeNew { index, args } => {
                let member = pool.member_ref(*index).ok()?;
                if member.name != "<init>" || member.class_name != builder {
                    return None;
                }
                let constructor_operand = match (member.descriptor.as_str(), args.as_slice()) {
                    ("()V", []) => false,
                    ("(I)V", [capacity]) => {
                        if !matches!(capacity.kind, InstructionKind::IConst { .. }) {
                            return None;
                        }
                        false
                    }
                    ("(Ljava/lang/String;)V", [_]) => {
                        signatures.push(STRING_SIGNATURE.to_string());
                        true
                    }
                    ("(Ljava/lang/CharSequence;)V", [_]) => {
                        signatures.push(CHAR_SEQUENCE_SIGNATURE.to_string());
                        true
                    }
                    _ => return None,
                };
                signatures.reverse();
                return Some(Chain {
                    signatures,
                    constructor_operand,
                });
            }
            _ => return None,
        }
    }
}

/// Checks that an integer literal appended through `parameter` is a value of that type.
fn literal_fits(operand: &Instruction, parameter: &str) -> bool {
    let InstructionKind::IConst { value, .. } = operand.kind else {
        return true;
    };
    match parameter {
        "Z" => matches!(value, 0 | 1),
        "C" => u16::try_from(value).is_ok(),
        "B" => i8::try_from(value).is_ok(),
        "S" => i16::try_from(value).is_ok(),
        _ => true,
    }
}

/// Gives `char` and `boolean` literals the type their `append` overload carried.
///
/// The JVM pushes both as plain integers, so once the call is gone `'x'` would print as `120`
/// and concatenate digits.
fn retag_literals(operands: &mut [Instruction], signatures: &[String]) -> usize {
    let mut retagged = 0;
    for (operand, parameter) in operands.iter_mut().zip(signatures) {
        if !matches!(parameter.as_str(), "C" | "Z") {
            continue;
        }
        if let InstructionKind::IConst { signature, .. } = &mut operand.kind {
            if *signature != *parameter {
                *signature = parameter.clone();
                retagged += 1;
            }
        }
    }
    retagged
}

/// Moves the operands out of a matched chain, head first.
fn take_operands(kind: InstructionKind, constructor_operand: bool) -> Vec<Instruction> {
    let mut operands = Vec::new();
    let InstructionKind::InvokeVirtual { objectref, .. } = kind else {
        return operands;
    };

    let mut current = *objectref;
    loop {
        match current.kind {
            InstructionKind::InvokeVirtual { objectref, args, .. } => {
                operands.extend(args);
                current = *objectref;
            }
            InstructionKind::InvokeNew { args, .. } => {
                if constructor_operand {
                    operands.extend(args);
                }
                break;
            }
            _ => break,
        }
    }
    operands.reverse();
    operands
}

/// Checks for `String.valueOf(x)` with any overload but `char[]`.
fn is_value_of(operand: &Instruction, pool: &ConstantPool) -> bool {
    let InstructionKind::InvokeStatic { index, args } = &operand.kind else {
        return false;
    };
    let Ok(member) = pool.member_ref(*index) else {
        return false;
    };
    member.class_name == STRING_CLASS
        && member.name == "valueOf"
        && args.len() == 1
        && member.descriptor != "([C)Ljava/lang/String;"
}

/// Pass folding builder chains into string concatenation.
pub struct StringConcatPass;

impl Default for StringConcatPass {
    fn default() -> Self {
        Self::new()
    }
}

impl StringConcatPass {
    /// Creates a new string concatenation pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit(&self, node: &mut Instruction, method: &str, ctx: &PassContext) -> Result<bool> {
        let pool = ctx.pool();
        let Some(Chain {
            signatures,
            constructor_operand,
        }) = match_chain(node, pool)
        else {
            return Ok(false);
        };

        let is_string = |i: usize| signatures.get(i).is_some_and(|s| s == STRING_SIGNATURE);
        let prefix = if is_string(0) || is_string(1) {
            None
        } else {
            Some(pool.intern_string("")?)
        };
        let peel = is_string(1);

        let (offset, line) = (node.offset, node.line);
        let kind = mem::replace(&mut node.kind, InstructionKind::AConstNull);
        let mut operands = take_operands(kind, constructor_operand);
        let retagged = retag_literals(&mut operands, &signatures);
        let count = operands.len();
        let mut operands = operands.into_iter();

        let first = match prefix {
            Some(empty) => Instruction::new(offset, line, InstructionKind::Ldc { index: empty }),
            None => match operands.next() {
                Some(mut leading) => {
                    if peel && is_value_of(&leading, pool) {
                        if let InstructionKind::InvokeStatic { mut args, .. } = leading.kind {
                            leading = args.remove(0);
                        }
                    }
                    leading
                }
                None => return Err(malformed_error!("builder chain without operands")),
            },
        };

        let folded = operands.fold(first, |left, right| {
            Instruction::new(
                offset,
                line,
                InstructionKind::BinaryOp {
                    op: BinaryOperator::Add,
                    signature: STRING_SIGNATURE.to_string(),
                    left: Box::new(left),
                    right: Box::new(right),
                },
            )
        });
        node.kind = folded.kind;

        ctx.events
            .record(EventKind::ConcatenationFolded)
            .at(node.offset)
            .method(method)
            .message(format!("{count} operand(s)"))
            .pass(self.name());
        if retagged > 0 {
            ctx.events
                .record(EventKind::ConstantRetyped)
                .at(node.offset)
                .method(method)
                .message(format!("{retagged} concatenation literal(s)"))
                .pass(self.name());
        }
        Ok(true)
    }
}

impl TreePass for StringConcatPass {
    fn name(&self) -> &'static str {
        "string-concat"
    }

    fn category(&self) -> DiagnosticCategory {
        DiagnosticCategory::StringConcat
    }

    fn run_on_method(&self, method: &mut MethodBody, ctx: &PassContext) -> Result<bool> {
        let MethodBody {
            name, statements, ..
        } = method;
        let name = name.as_str();
        walk::post_order(statements, ctx, self.category(), &mut |node| {
            self.visit(node, name, ctx)
        })
    }

    fn description(&self) -> &'static str {
        "Folds StringBuilder append chains into string concatenation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::factories::{
        classfile::{create_context, create_pool},
        instruction::{append, iconst, iload, ldc_string, new_builder, node, to_string},
    };

    fn operands(tree: &Instruction) -> Vec<&Instruction> {
        match &tree.kind {
            InstructionKind::BinaryOp {
                op: BinaryOperator::Add,
                left,
                right,
                ..
            } => {
                let mut out = operands(left);
                out.push(right);
                out
            }
            _ => vec![tree],
        }
    }

    fn fold(pool: ConstantPool, tree: Instruction) -> (bool, Instruction, PassContext) {
        let ctx = create_context(pool);
        let mut method = MethodBody::new("run", "()V").with_statement(tree);
        let changed = StringConcatPass::new()
            .run_on_method(&mut method, &ctx)
            .unwrap();
        (changed, method.statements.remove(0), ctx)
    }

    #[test]
    fn test_fold_preserves_append_order() {
        let pool = create_pool();
        let mut chain = new_builder(&pool, STRING_BUILDER_CLASS);
        for text in ["a", "b", "c"] {
            let arg = ldc_string(&pool, text);
            chain = append(&pool, STRING_BUILDER_CLASS, STRING_SIGNATURE, chain, arg);
        }
        let tree = to_string(&pool, STRING_BUILDER_CLASS, chain);

        let (changed, tree, ctx) = fold(pool, tree);

        assert!(changed);
        let values: Vec<String> = operands(&tree)
            .iter()
            .map(|n| match n.kind {
                InstructionKind::Ldc { index } => ctx.pool().string_value(index).unwrap(),
                _ => panic!("unexpected operand {:?}", n.kind),
            })
            .collect();
        assert_eq!(values, vec!["a", "b", "c"]);
        assert_eq!(ctx.events.count_kind(EventKind::ConcatenationFolded), 1);
    }

    #[test]
    fn test_string_buffer_with_constructor_operand() {
        let pool = create_pool();
        let first = ldc_string(&pool, "x");
        let mut chain = new_builder(&pool, STRING_BUFFER_CLASS);
        if let InstructionKind::InvokeNew { index, args } = &mut chain.kind {
            *index = pool
                .intern_methodref(STRING_BUFFER_CLASS, "<init>", "(Ljava/lang/String;)V")
                .unwrap();
            args.push(first);
        }
        let chain = append(&pool, STRING_BUFFER_CLASS, "I", chain, iload(1));
        let tree = to_string(&pool, STRING_BUFFER_CLASS, chain);

        let (changed, tree, _) = fold(pool, tree);

        assert!(changed);
        let parts = operands(&tree);
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0].kind, InstructionKind::Ldc { .. }));
        assert!(matches!(parts[1].kind, InstructionKind::ILoad { slot: 1 }));
    }

    #[test]
    fn test_non_string_operands_get_empty_prefix() {
        let pool = create_pool();
        let chain = new_builder(&pool, STRING_BUILDER_CLASS);
        let chain = append(&pool, STRING_BUILDER_CLASS, "I", chain, iload(1));
        let chain = append(&pool, STRING_BUILDER_CLASS, "C", chain, iconst("C", 45));
        let tree = to_string(&pool, STRING_BUILDER_CLASS, chain);

        let (changed, tree, ctx) = fold(pool, tree);

        assert!(changed);
        let parts = operands(&tree);
        assert_eq!(parts.len(), 3);
        let InstructionKind::Ldc { index } = parts[0].kind else {
            panic!("expected empty string prefix");
        };
        assert_eq!(ctx.pool().string_value(index).unwrap(), "");
    }

    #[test]
    fn test_single_string_operand_folds_to_itself() {
        let pool = create_pool();
        let arg = ldc_string(&pool, "only");
        let chain = new_builder(&pool, STRING_BUILDER_CLASS);
        let chain = append(&pool, STRING_BUILDER_CLASS, STRING_SIGNATURE, chain, arg.clone());
        let tree = to_string(&pool, STRING_BUILDER_CLASS, chain);

        let (changed, tree, _) = fold(pool, tree);

        assert!(changed);
        assert_eq!(tree.kind, arg.kind);
    }

    #[test]
    fn test_char_array_append_not_folded() {
        let pool = create_pool();
        let chain = new_builder(&pool, STRING_BUILDER_CLASS);
        let chars = node(InstructionKind::ALoad {
            slot: 2,
            signature: "[C".to_string(),
        });
        let chain = append(&pool, STRING_BUILDER_CLASS, "[C", chain, chars);
        let tree = to_string(&pool, STRING_BUILDER_CLASS, chain);
        let original = tree.clone();

        let (changed, tree, _) = fold(pool, tree);

        assert!(!changed);
        assert_eq!(tree, original);
    }

    #[test]
    fn test_chain_on_local_builder_not_folded() {
        let pool = create_pool();
        let local = node(InstructionKind::ALoad {
            slot: 3,
            signature: class_signature(STRING_BUILDER_CLASS),
        });
        let chain = append(&pool, STRING_BUILDER_CLASS, "I", local, iload(1));
        let tree = to_string(&pool, STRING_BUILDER_CLASS, chain);

        let (changed, _, _) = fold(pool, tree);
        assert!(!changed);
    }

    #[test]
    fn test_char_and_boolean_literals_keep_append_type() {
        let pool = create_pool();
        let head = ldc_string(&pool, "a");
        let chain = new_builder(&pool, STRING_BUILDER_CLASS);
        let chain = append(&pool, STRING_BUILDER_CLASS, STRING_SIGNATURE, chain, head);
        let chain = append(&pool, STRING_BUILDER_CLASS, "C", chain, iconst("B", 120));
        let chain = append(&pool, STRING_BUILDER_CLASS, "Z", chain, iconst("I", 1));
        let tree = to_string(&pool, STRING_BUILDER_CLASS, chain);

        let (changed, tree, ctx) = fold(pool, tree);

        assert!(changed);
        let parts = operands(&tree);
        assert_eq!(parts.len(), 3);
        assert!(matches!(
            &parts[1].kind,
            InstructionKind::IConst { signature, value: 120 } if signature == "C"
        ));
        assert!(matches!(
            &parts[2].kind,
            InstructionKind::IConst { signature, value: 1 } if signature == "Z"
        ));
        assert!(ctx.events.has(EventKind::ConstantRetyped));
    }

    #[test]
    fn test_literal_outside_append_type_not_folded() {
        let pool = create_pool();
        let chain = new_builder(&pool, STRING_BUILDER_CLASS);
        let chain = append(&pool, STRING_BUILDER_CLASS, "Z", chain, iconst("I", 2));
        let tree = to_string(&pool, STRING_BUILDER_CLASS, chain);
        let original = tree.clone();

        let (changed, tree, _) = fold(pool, tree);

        assert!(!changed);
        assert_eq!(tree, original);
    }

    #[test]
    fn test_value_of_kept_without_string_second_operand() {
        let pool = create_pool();
        let value_of = pool
            .intern_methodref(STRING_CLASS, "valueOf", "(I)Ljava/lang/String;")
            .unwrap();
        let call = node(InstructionKind::InvokeStatic {
            index: value_of,
            args: vec![iload(1)],
        });
        let chain = new_builder(&pool, STRING_BUILDER_CLASS);
        let chain = append(&pool, STRING_BUILDER_CLASS, STRING_SIGNATURE, chain, call);
        let chain = append(&pool, STRING_BUILDER_CLASS, "I", chain, iload(2));
        let tree = to_string(&pool, STRING_BUILDER_CLASS, chain);

        let (changed, tree, _) = fold(pool, tree);

        assert!(changed);
        let parts = operands(&tree);
        assert!(matches!(parts[0].kind, InstructionKind::InvokeStatic { .. }));
    }
}
