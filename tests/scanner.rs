#[cfg(test)]
mod scanner_tests {
    use rox::error::LoxError;
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn single_character_lexemes_round_trip() {
        for ch in "(){},.-+;*".chars() {
            let source = ch.to_string();
            let (tokens, errors) = rox::scan(&source);

            assert!(errors.is_empty());
            assert_eq!(tokens.len(), 2, "expected token + EOF for {:?}", ch);
            assert_eq!(tokens[0].lexeme, source);
            assert_eq!(tokens[0].line, 1);
            assert_eq!(tokens[1].token_type, TokenType::EOF);
        }
    }

    #[test]
    fn two_character_operators_are_greedy() {
        assert_token_sequence(
            "!= == <= >= ! = < > /",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::BANG, "!"),
                (TokenType::EQUAL, "="),
                (TokenType::LESS, "<"),
                (TokenType::GREATER, ">"),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn at_sign_is_a_single_lexical_error() {
        let (tokens, errors) = rox::scan("@");

        assert_eq!(errors.len(), 1);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::EOF);

        match &errors[0] {
            LoxError::Lex {
                message,
                line,
                position,
            } => {
                assert_eq!(message, "Unexpected character: @");
                assert_eq!(*line, 1);
                assert_eq!(*position, 0);
            }
            other => panic!("expected lexical error, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let results: Vec<_> = Scanner::new(source).collect();

        // COMMA, DOT, error($), LEFT_PAREN, error(#), EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(errors, vec![
            "[line 1] Error: Unexpected character: $".to_string(),
            "[line 1] Error: Unexpected character: #".to_string(),
        ]);

        fn assert_token_matches(
            result: &Result<Token, LoxError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(token.token_type, expected_type);
                    assert_eq!(token.lexeme, expected_lexeme);
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn non_ascii_character_is_one_error() {
        let (tokens, errors) = rox::scan("a é b");

        assert_eq!(errors.len(), 1);
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["a", "b", ""]);
    }

    #[test]
    fn comments_and_newlines_advance_lines() {
        let (tokens, errors) = rox::scan("// first line\nvar x; // trailing\n\nprint x;");

        assert!(errors.is_empty());
        assert_eq!(tokens[0].token_type, TokenType::VAR);
        assert_eq!(tokens[0].line, 2);

        let print = tokens
            .iter()
            .find(|t| t.token_type == TokenType::PRINT)
            .expect("print token");
        assert_eq!(print.line, 4);
    }

    #[test]
    fn strings_and_numbers_carry_literals() {
        let (tokens, errors) = rox::scan("\"hi there\" 12 3.5 7.");

        assert!(errors.is_empty());
        assert_eq!(tokens[0].token_type, TokenType::STRING("hi there".into()));
        assert_eq!(tokens[0].lexeme, "\"hi there\"");
        assert_eq!(
            tokens[0].literal(),
            Some(rox::expr::LiteralValue::Str("hi there".into()))
        );

        assert_eq!(tokens[1].literal(), Some(rox::expr::LiteralValue::Number(12.0)));
        assert_eq!(tokens[2].literal(), Some(rox::expr::LiteralValue::Number(3.5)));

        // "7." is a number followed by a dot.
        assert_eq!(tokens[3].literal(), Some(rox::expr::LiteralValue::Number(7.0)));
        assert_eq!(tokens[4].token_type, TokenType::DOT);
    }

    #[test]
    fn multi_line_string_counts_lines() {
        let (tokens, errors) = rox::scan("\"a\nb\"\nx");

        assert!(errors.is_empty());
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn unterminated_string_is_reported_and_scanning_ends() {
        let (tokens, errors) = rox::scan("print \"oops");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unterminated string."));
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].token_type, TokenType::EOF);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_token_sequence(
            "and break class else false for fun if nil or print return super this true var while orchid _x1",
            &[
                (TokenType::AND, "and"),
                (TokenType::BREAK, "break"),
                (TokenType::CLASS, "class"),
                (TokenType::ELSE, "else"),
                (TokenType::FALSE, "false"),
                (TokenType::FOR, "for"),
                (TokenType::FUN, "fun"),
                (TokenType::IF, "if"),
                (TokenType::NIL, "nil"),
                (TokenType::OR, "or"),
                (TokenType::PRINT, "print"),
                (TokenType::RETURN, "return"),
                (TokenType::SUPER, "super"),
                (TokenType::THIS, "this"),
                (TokenType::TRUE, "true"),
                (TokenType::VAR, "var"),
                (TokenType::WHILE, "while"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::IDENTIFIER, "_x1"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn token_display_and_json() {
        let (tokens, _) = rox::scan("42 \"s\" name");

        assert_eq!(tokens[0].to_string(), "NUMBER 42 42.0");
        assert_eq!(tokens[1].to_string(), "STRING \"s\" s");
        assert_eq!(tokens[2].to_string(), "IDENTIFIER name null");
        assert_eq!(tokens[3].to_string(), "EOF  null");

        let json = serde_json::to_value(&tokens[2]).expect("serializable");
        assert_eq!(json["lexeme"], "name");
        assert_eq!(json["line"], 1);
    }
}
