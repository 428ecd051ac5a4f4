//! Declarations in English
//!
//! Declarator trees are type-ordered, so reading one from the root down to the
//! identifier yields the type phrases in English order: `int *a[3]` is
//! `Array(Pointer(a))`, read "array 3 of pointer to", then the specifier.

use crate::parser::ast::*;

/// Explain every declaration and function definition of `unit`, one line each.
pub fn explain_unit(unit: &TranslationUnit) -> Vec<String> {
    unit.nodes
        .iter()
        .filter_map(|node| match node {
            AstNode::Declaration(decl) => Some(explain_declaration(decl)),
            AstNode::FunctionDefinition(def) => Some(explain_function(def)),
            AstNode::Statement(_) => None,
        })
        .collect()
}

/// `declare NAME as TYPE`, or `define SPECIFIER` for a declaration without
/// a declarator such as `struct point { ... };`
pub fn explain_declaration(decl: &Declaration) -> String {
    match &decl.declarator {
        Some(declarator) => {
            let ty = explain_type(&decl.specifier, Some(declarator));
            match declarator.identifier() {
                Some(name) => format!("declare {} as {}", name, ty),
                None => format!("declare {}", ty),
            }
        }
        None => format!("define {}", specifier_text(&decl.specifier)),
    }
}

pub fn explain_function(def: &FunctionDefinition) -> String {
    let ty = explain_type(&def.specifier, Some(&def.declarator));
    format!("define {} as {}", def.name().unwrap_or("<unnamed>"), ty)
}

/// The type a declarator derives from a specifier, e.g. `pointer to char`
pub fn explain_type(specifier: &DeclSpecifier, declarator: Option<&Declarator>) -> String {
    let mut phrases = Vec::new();
    let mut node = declarator;

    while let Some(current) = node {
        match current {
            Declarator::Identifier { .. } => break,
            Declarator::Pointer { .. } => phrases.push("pointer to".to_string()),
            Declarator::Array { size, .. } => match size.as_deref() {
                Some(Expr::IntegerConstant { value, .. }) => {
                    phrases.push(format!("array {} of", value))
                }
                _ => phrases.push("array of".to_string()),
            },
            Declarator::Function {
                params, variadic, ..
            } => {
                let mut args: Vec<String> = params
                    .iter()
                    .map(|param| explain_type(&param.specifier, param.declarator.as_ref()))
                    .collect();
                if *variadic {
                    args.push("...".to_string());
                }
                if args.is_empty() {
                    phrases.push("function returning".to_string());
                } else {
                    phrases.push(format!("function ({}) returning", args.join(", ")));
                }
            }
        }
        node = current.inner();
    }

    phrases.push(specifier_text(specifier));
    phrases.join(" ")
}

fn specifier_text(specifier: &DeclSpecifier) -> String {
    match (specifier, specifier.tag()) {
        (DeclSpecifier::Basic { kind, .. }, _) => kind.to_string(),
        (_, Some(tag)) => format!("{} {}", specifier.kind(), tag),
        (_, None) => format!("anonymous {}", specifier.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn explain(source: &str) -> Vec<String> {
        let output = Parser::from_source(source).parse_translation_unit();
        explain_unit(&output.unit)
    }

    #[test]
    fn test_array_of_pointer() {
        assert_eq!(explain("int *a[3];"), ["declare a as array 3 of pointer to int"]);
        assert_eq!(explain("int *a[];"), ["declare a as array of pointer to int"]);
    }

    #[test]
    fn test_pointer_to_array() {
        assert_eq!(explain("char (*p)[8];"), ["declare p as pointer to array 8 of char"]);
    }

    #[test]
    fn test_functions() {
        assert_eq!(
            explain("char *strdup(char *s); int printf(char *, ...);"),
            [
                "declare strdup as function (pointer to char) returning pointer to char",
                "declare printf as function (pointer to char, ...) returning int",
            ]
        );
        assert_eq!(
            explain("int main(void) { return 0; }"),
            ["define main as function returning int"]
        );
    }

    #[test]
    fn test_tagged_types() {
        assert_eq!(
            explain("struct node { int value; }; struct node *head; enum { A } e;"),
            [
                "define struct node",
                "declare head as pointer to struct node",
                "declare e as anonymous enum",
            ]
        );
    }
}
