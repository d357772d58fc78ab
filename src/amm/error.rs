//! Tipo de erro unificado do AMM com formatação estável.
use core::fmt;
use std::collections::BTreeMap;

use crate::amm::error_catalog::{default_locale_message, AmmErrorCode};

const CONTEXT_VALUE_MAX: usize = 256;

fn sanitize_value(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|ch| match ch {
            '\n' | '\r' | '\t' => ' ',
            other => other,
        })
        .collect();
    if cleaned.chars().count() > CONTEXT_VALUE_MAX {
        let mut truncated: String = cleaned.chars().take(CONTEXT_VALUE_MAX - 1).collect();
        truncated.push('…');
        truncated
    } else {
        cleaned
    }
}

fn escape_json(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{08}' => escaped.push_str("\\b"),
            '\u{0c}' => escaped.push_str("\\f"),
            c if c.is_control() => {
                use core::fmt::Write as _;
                let _ = write!(&mut escaped, "\\u{:04x}", c as u32);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Substitui `{chave}` pelo valor do contexto; chaves desconhecidas ficam intactas.
fn render_template(template: &str, context: &BTreeMap<String, String>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(ch) = chars.next() {
        if ch != '{' {
            rendered.push(ch);
            continue;
        }
        let key: String = chars.by_ref().take_while(|c| *c != '}').collect();
        match context.get(&key) {
            Some(value) if !key.is_empty() => rendered.push_str(value),
            _ => {
                rendered.push('{');
                rendered.push_str(&key);
                rendered.push('}');
            }
        }
    }
    rendered
}

/// Erro do AMM com contexto estruturado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmmError {
    pub code: AmmErrorCode,
    pub context: BTreeMap<String, String>,
}

impl AmmError {
    /// Cria um novo erro sem contexto adicional.
    pub fn new(code: AmmErrorCode) -> Self {
        Self {
            code,
            context: BTreeMap::new(),
        }
    }

    /// Adiciona um par chave/valor ao contexto.
    pub fn with_context<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        let key_string = key.into();
        if !key_string.is_empty() {
            let sanitized = sanitize_value(&value.to_string());
            self.context.insert(key_string, sanitized);
        }
        self
    }

    pub fn code(&self) -> AmmErrorCode {
        self.code
    }

    fn resolved_message(&self) -> String {
        render_template(default_locale_message(self.code), &self.context)
    }

    /// Mensagem curta para UI.
    pub fn to_user_string(&self) -> String {
        format!("[{}] {}", self.code.code(), self.resolved_message())
    }

    /// Renderiza um template arbitrário usando o contexto atual.
    pub fn render_with_template(&self, template: &str) -> String {
        render_template(template, &self.context)
    }

    /// Serialização estável em JSON para logs.
    pub fn to_log_json(&self) -> String {
        let message = self.resolved_message();
        let mut json = String::from("{");
        json.push_str("\"code\":\"");
        json.push_str(&escape_json(self.code.code()));
        json.push_str("\",\"title\":\"");
        json.push_str(&escape_json(self.code.title()));
        json.push_str("\",\"message\":\"");
        json.push_str(&escape_json(&message));
        json.push_str("\",\"context\":{");
        for (idx, (key, value)) in self.context.iter().enumerate() {
            if idx > 0 {
                json.push(',');
            }
            json.push('"');
            json.push_str(&escape_json(key));
            json.push_str("\":\"");
            json.push_str(&escape_json(value));
            json.push('"');
        }
        json.push_str("}}");
        json
    }
}

impl From<AmmErrorCode> for AmmError {
    fn from(code: AmmErrorCode) -> Self {
        Self::new(code)
    }
}

/// Permite `assert_eq!(err, AmmErrorCode::ZeroAmount)` ignorando o contexto.
impl PartialEq<AmmErrorCode> for AmmError {
    fn eq(&self, other: &AmmErrorCode) -> bool {
        self.code == *other
    }
}

impl fmt::Display for AmmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_user_string())
    }
}

impl std::error::Error for AmmError {}

/// Resultado padrão para operações do AMM.
pub type Result<T> = std::result::Result<T, AmmError>;

#[macro_export]
macro_rules! amm_err {
  ($code:expr) => {{
    $crate::amm::error::AmmError::new($code)
  }};
  ($code:expr, $($key:ident => $value:expr),+ $(,)?) => {{
    let mut err = $crate::amm::error::AmmError::new($code);
    $(
      err = err.with_context(stringify!($key), $value);
    )+
    err
  }};
  ($code:expr, { $($key:expr => $value:expr),+ $(,)? }) => {{
    let mut err = $crate::amm::error::AmmError::new($code);
    $(
      err = err.with_context($key, $value);
    )+
    err
  }};
}

#[macro_export]
macro_rules! amm_bail {
  ($($tt:tt)*) => {
    return Err($crate::amm_err!($($tt)*))
  };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_string_basic() {
        let err = AmmError::new(AmmErrorCode::ZeroAmount);
        assert_eq!(err.to_user_string(), "[AMM-0001] amount deve ser > 0");
    }

    #[test]
    fn placeholder_subst() {
        let err = AmmError::new(AmmErrorCode::Overflow).with_context("op", "mul_div");
        assert_eq!(err.render_with_template("falha em {op}"), "falha em mul_div");
    }

    #[test]
    fn log_json_shape() {
        let err = AmmError::new(AmmErrorCode::InsufficientShares)
            .with_context("requested", 10)
            .with_context("balance", 3);
        let json = err.to_log_json();
        assert!(json.starts_with('{'));
        assert!(json.contains("\"code\":\"AMM-0003\""));
        assert!(json.contains("\"context\":{\"balance\":\"3\",\"requested\":\"10\"}"));
    }

    #[test]
    fn compares_against_code() {
        let err = AmmError::from(AmmErrorCode::TransferFailed).with_context("asset", "A");
        assert_eq!(err, AmmErrorCode::TransferFailed);
        assert!(err != AmmErrorCode::Overflow);
    }

    #[test]
    fn macros_variants() {
        let err = amm_err!(AmmErrorCode::ZeroAmount, amount => 0);
        assert_eq!(err.code, AmmErrorCode::ZeroAmount);
        assert_eq!(err.context.get("amount").map(String::as_str), Some("0"));

        let err_block = amm_err!(AmmErrorCode::InsufficientReserves, { "reserve_a" => 0 });
        assert_eq!(err_block.code, AmmErrorCode::InsufficientReserves);
        assert_eq!(err_block.context.get("reserve_a").map(String::as_str), Some("0"));
    }

    fn bails() -> Result<()> {
        amm_bail!(AmmErrorCode::InvalidFee, fee_bps => 10_000);
    }

    #[test]
    fn bail_returns_err() {
        let err = bails().unwrap_err();
        assert_eq!(err, AmmErrorCode::InvalidFee);
        assert_eq!(err.context.get("fee_bps").map(String::as_str), Some("10000"));
    }
}
