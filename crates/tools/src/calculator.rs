//! Calculator tool: evaluates mathematical expressions.
//!
//! Supports `+`, `-`, `*`, `/`, `%`, `^` (right-associative power),
//! parentheses, unary signs, the constants `pi` and `e`, and the
//! functions `sqrt`, `sin`, `cos`, `tan`, `log`, `log10`, `abs`, `round`.
//! Uses a recursive-descent parser; nothing is ever `eval`ed.

use async_trait::async_trait;
use troupe_core::error::{ToolError, ERROR_PREFIX};
use troupe_core::tool::{Tool, ToolResult};
use tracing::debug;

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate a mathematical expression safely. Supports + - * / % ^, parentheses, \
         pi, e and the functions sqrt, sin, cos, tan, log, log10, abs, round. \
         Examples: '2 + 3 * 4', 'sqrt(16)', 'sin(pi/2)'."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The mathematical expression to evaluate, e.g. '(2 + 3) * 4' or 'sqrt(16)'"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let expr = arguments["expression"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'expression' argument".into()))?;

        match evaluate(expr) {
            Ok(value) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format_number(value),
                data: Some(serde_json::json!({"result": value})),
            }),
            Err(e) => {
                debug!(expression = expr, error = %e, "Calculator rejected expression");
                Ok(ToolResult {
                    call_id: String::new(),
                    success: false,
                    output: format!("{ERROR_PREFIX}cannot evaluate '{expr}': {e}"),
                    data: None,
                })
            }
        }
    }
}

/// Integers print without a fractional part; everything else is rounded
/// to 10 decimal places.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let rounded = (value * 1e10).round() / 1e10;
        format!("{}", rounded)
    }
}

// ── Recursive-descent expression evaluator ────────────────────────────────

/// Evaluate a mathematical expression string.
pub fn evaluate(expr: &str) -> Result<f64, String> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser::new(&tokens);
    let result = parser.parse_expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(format!(
            "Unexpected token at position {}: {:?}",
            parser.pos, parser.tokens[parser.pos]
        ));
    }
    if !result.is_finite() {
        return Err("Result is not a finite number".into());
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => { tokens.push(Token::Plus); i += 1; }
            '-' => { tokens.push(Token::Minus); i += 1; }
            // `**` is accepted as an alias for `^`.
            '*' if chars.get(i + 1) == Some(&'*') => { tokens.push(Token::Caret); i += 2; }
            '*' => { tokens.push(Token::Star); i += 1; }
            '/' => { tokens.push(Token::Slash); i += 1; }
            '%' => { tokens.push(Token::Percent); i += 1; }
            '^' => { tokens.push(Token::Caret); i += 1; }
            '(' => { tokens.push(Token::LParen); i += 1; }
            ')' => { tokens.push(Token::RParen); i += 1; }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let num_str: String = chars[start..i].iter().collect();
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| format!("Invalid number: {}", num_str))?;
                tokens.push(Token::Number(num));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            c => return Err(format!("Unexpected character: '{}'", c)),
        }
    }

    Ok(tokens)
}

/// Recursion ceiling for nested parentheses, signs and powers.
const MAX_DEPTH: usize = 256;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0, depth: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested(&mut self, f: fn(&mut Self) -> Result<f64, String>) -> Result<f64, String> {
        if self.depth >= MAX_DEPTH {
            return Err("Expression nested too deeply".into());
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn consume(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, String> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.consume();
                    left += self.parse_term()?;
                }
                Token::Minus => {
                    self.consume();
                    left -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // term = unary (('*' | '/' | '%') unary)*
    fn parse_term(&mut self) -> Result<f64, String> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.consume();
                    left *= self.parse_unary()?;
                }
                Token::Slash => {
                    self.consume();
                    let right = self.parse_unary()?;
                    if right == 0.0 {
                        return Err("Division by zero".into());
                    }
                    left /= right;
                }
                Token::Percent => {
                    self.consume();
                    let right = self.parse_unary()?;
                    if right == 0.0 {
                        return Err("Division by zero".into());
                    }
                    // Sign follows the divisor, as in floored modulo.
                    left = left - right * (left / right).floor();
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // unary = ('-' | '+') unary | power
    fn parse_unary(&mut self) -> Result<f64, String> {
        self.nested(Self::parse_unary_inner)
    }

    fn parse_unary_inner(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.consume();
                Ok(-self.parse_unary()?)
            }
            Some(Token::Plus) => {
                self.consume();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    // power = primary ('^' unary)?
    fn parse_power(&mut self) -> Result<f64, String> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.consume();
            let exponent = self.parse_unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    // primary = NUMBER | CONST | FUNC '(' expr ')' | '(' expr ')'
    fn parse_primary(&mut self) -> Result<f64, String> {
        self.nested(Self::parse_primary_inner)
    }

    fn parse_primary_inner(&mut self) -> Result<f64, String> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(*n),
            Some(Token::LParen) => {
                let val = self.parse_expr()?;
                self.expect_rparen()?;
                Ok(val)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "pi" => Ok(std::f64::consts::PI),
                "e" => Ok(std::f64::consts::E),
                _ if !FUNCTIONS.contains(&name.as_str()) => {
                    Err(format!("Unsupported function or name: {}", name))
                }
                _ => {
                    match self.consume() {
                        Some(Token::LParen) => {}
                        _ => return Err(format!("Expected '(' after function '{}'", name)),
                    }
                    let arg = self.parse_expr()?;
                    self.expect_rparen()?;
                    apply_function(name, arg)
                }
            },
            Some(tok) => Err(format!("Unexpected token: {:?}", tok)),
            None => Err("Unexpected end of expression".into()),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), String> {
        match self.consume() {
            Some(Token::RParen) => Ok(()),
            _ => Err("Expected closing parenthesis".into()),
        }
    }
}

const FUNCTIONS: &[&str] = &["sqrt", "sin", "cos", "tan", "log", "log10", "abs", "round"];

fn apply_function(name: &str, x: f64) -> Result<f64, String> {
    match name {
        "sqrt" if x < 0.0 => Err("Square root of a negative number".into()),
        "sqrt" => Ok(x.sqrt()),
        "sin" => Ok(x.sin()),
        "cos" => Ok(x.cos()),
        "tan" => Ok(x.tan()),
        "log" | "log10" if x <= 0.0 => Err("Logarithm of a non-positive number".into()),
        "log" => Ok(x.ln()),
        "log10" => Ok(x.log10()),
        "abs" => Ok(x.abs()),
        "round" => Ok(x.round()),
        other => Err(format!("Unsupported function or name: {}", other)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_precedence() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
    }

    #[test]
    fn parentheses() {
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
    }

    #[test]
    fn division_by_zero() {
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("1 % 0").is_err());
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let parens = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
        assert_eq!(evaluate(&parens).unwrap_err(), "Expression nested too deeply");
        assert!(evaluate(&format!("{}1", "-".repeat(200_000))).is_err());
        assert!(evaluate(&format!("2{}", "^2".repeat(200_000))).is_err());
    }

    #[test]
    fn moderate_nesting_still_evaluates() {
        let parens = format!("{}7{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(evaluate(&parens).unwrap(), 7.0);
        let flat = vec!["1"; 5_000].join(" + ");
        assert_eq!(evaluate(&flat).unwrap(), 5000.0);
    }

    #[tokio::test]
    async fn deep_nesting_becomes_an_error_observation() {
        let expression = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
        let result = CalculatorTool
            .execute(serde_json::json!({ "expression": expression }))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.starts_with("error: cannot evaluate"));
        assert!(result.output.contains("nested too deeply"));
    }

    #[test]
    fn unary_signs() {
        assert_eq!(evaluate("-5 + 3").unwrap(), -2.0);
        assert_eq!(evaluate("+5").unwrap(), 5.0);
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(evaluate("2 ^ 3 ^ 2").unwrap(), 512.0);
        assert_eq!(evaluate("2 ** 10").unwrap(), 1024.0);
        assert_eq!(evaluate("-2 ^ 2").unwrap(), -4.0);
    }

    #[test]
    fn modulo_follows_divisor_sign() {
        assert_eq!(evaluate("7 % 3").unwrap(), 1.0);
        assert_eq!(evaluate("-7 % 3").unwrap(), 2.0);
    }

    #[test]
    fn functions_and_constants() {
        assert_eq!(evaluate("sqrt(16)").unwrap(), 4.0);
        assert!((evaluate("sin(pi / 2)").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(evaluate("log10(1000)").unwrap(), 3.0);
        assert_eq!(evaluate("abs(-3) + round(2.6)").unwrap(), 6.0);
        assert!((evaluate("log(e)").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_function_rejected() {
        let err = evaluate("exec(1)").unwrap_err();
        assert!(err.contains("exec"));
    }

    #[test]
    fn invalid_expression() {
        assert!(evaluate("2 +").is_err());
        assert!(evaluate("").is_err());
        assert!(evaluate("sqrt 4").is_err());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333");
    }

    #[tokio::test]
    async fn tool_execute() {
        let tool = CalculatorTool;
        let result = tool
            .execute(serde_json::json!({"expression": "(12 + 8) * 3"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "60");
    }

    #[tokio::test]
    async fn tool_reports_errors_as_text() {
        let tool = CalculatorTool;
        let result = tool
            .execute(serde_json::json!({"expression": "1 / 0"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.starts_with(ERROR_PREFIX));
    }

    #[tokio::test]
    async fn tool_missing_expression() {
        let tool = CalculatorTool;
        let result = tool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
