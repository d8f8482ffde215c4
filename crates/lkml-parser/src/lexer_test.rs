use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    tokenize("test.lkml", src)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn word(s: &str) -> TokenKind {
    TokenKind::Word(s.to_string())
}

#[test]
fn simple_block_tokens() {
    assert_eq!(
        kinds("view: orders { }"),
        vec![
            word("view"),
            TokenKind::Colon,
            word("orders"),
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comments_are_skipped_but_lines_counted() {
    let tokens = tokenize("t.lkml", "# header\n# more\nview: a {\n}\n").unwrap();
    assert_eq!(tokens[0].kind, word("view"));
    assert_eq!(tokens[0].line, 3);
    assert_eq!(tokens[0].column, 1);
    let rbrace = tokens.iter().find(|t| t.kind == TokenKind::RBrace).unwrap();
    assert_eq!(rbrace.line, 4);
}

#[test]
fn trailing_comment_after_value() {
    assert_eq!(
        kinds("type: string # the type\nhidden: yes"),
        vec![
            word("type"),
            TokenKind::Colon,
            word("string"),
            word("hidden"),
            TokenKind::Colon,
            word("yes"),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn quoted_string_with_escapes_and_hash() {
    assert_eq!(
        kinds(r##"label: "Order \"#\" \\ total""##),
        vec![
            word("label"),
            TokenKind::Colon,
            TokenKind::Quoted(r##"Order "#" \ total"##.to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn expression_runs_to_double_semicolon() {
    let tokens = tokenize("t.lkml", "sql: ${TABLE}.id # not a comment\n  + 1 ;;\ntype: number").unwrap();
    assert_eq!(
        tokens[2].kind,
        TokenKind::Expr("${TABLE}.id # not a comment\n  + 1".to_string())
    );
    assert_eq!(tokens[2].line, 1);
    assert_eq!(tokens[2].column, 6);
    // line counting continues through the expression
    assert_eq!(tokens[3].kind, word("type"));
    assert_eq!(tokens[3].line, 3);
}

#[test]
fn sql_prefixed_keys_are_expressions() {
    let tokens = kinds("sql_on: ${a.id} = ${b.a_id} ;;");
    assert_eq!(tokens[2], TokenKind::Expr("${a.id} = ${b.a_id}".to_string()));
    assert!(is_expression_key("html"));
    assert!(is_expression_key("sql_table_name"));
    assert!(!is_expression_key("sq"));
    assert!(!is_expression_key("type"));
}

#[test]
fn empty_expression() {
    assert_eq!(kinds("sql: ;;")[2], TokenKind::Expr(String::new()));
}

#[test]
fn unterminated_string_is_error() {
    let err = tokenize("t.lkml", "label: \"oops\nview: x {}").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnterminatedString {
            path: "t.lkml".into(),
            line: 1,
            column: 8,
        }
    );
}

#[test]
fn unterminated_expression_is_error() {
    let err = tokenize("t.lkml", "dimension: x {\n  sql: ${TABLE}.x\n}").unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnterminatedExpression { line: 2, ref key, .. } if key == "sql"
    ));
}

#[test]
fn refinement_and_signed_words() {
    assert_eq!(
        kinds("view: +orders { fields: [-orders.secret] }"),
        vec![
            word("view"),
            TokenKind::Colon,
            word("+orders"),
            TokenKind::LBrace,
            word("fields"),
            TokenKind::Colon,
            TokenKind::LBracket,
            word("-orders.secret"),
            TokenKind::RBracket,
            TokenKind::RBrace,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn columns_count_characters_not_bytes() {
    let tokens = tokenize("t.lkml", "label: \"é\" x").unwrap();
    let last_word = tokens.iter().find(|t| t.kind == word("x")).unwrap();
    assert_eq!(last_word.column, 12);
}
