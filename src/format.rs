// ============================================================================
// Formatage des nombres pour l'affichage
// ============================================================================
// Fonctions pures : un nombre en entrée, une String en sortie
//
// Style en-US :
// - Symbole de devise en préfixe ($, €, £, ¥, ₹)
// - Séparateur de milliers : virgule
// - Signe moins avant le symbole : -$12.50
//
// Seuils fixes pour les abréviations : 1e6 (M), 1e9 (B), 1e12 (T)
// ============================================================================

/// Placeholder affiché quand une valeur est absente
pub const PLACEHOLDER: &str = "--";

/// Direction de la variation de prix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Indicateur visuel (même flèches que la watchlist)
    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
        }
    }
}

/// Variation 24h prête à afficher
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange {
    pub text: String,
    pub trend: Trend,
}

impl PriceChange {
    /// "▲ +2.45%" ou "▼ -1.23%"
    pub fn display(&self) -> String {
        format!("{} {}", self.trend.arrow(), self.text)
    }
}

/// Retourne le préfixe d'affichage d'un code devise
///
/// Les codes sans symbole connu donnent le code en majuscules suivi d'un espace ("CHF ")
pub fn currency_prefix(currency: &str) -> String {
    match currency.to_ascii_lowercase().as_str() {
        "usd" => "$".to_string(),
        "eur" => "€".to_string(),
        "gbp" => "£".to_string(),
        "jpy" | "cny" => "¥".to_string(),
        "inr" => "₹".to_string(),
        other => format!("{} ", other.to_ascii_uppercase()),
    }
}

/// Ajoute les séparateurs de milliers à une partie entière ("1234567" -> "1,234,567")
fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formate la valeur absolue avec entre `min_frac` et `max_frac` décimales
///
/// Les zéros de fin au-delà de `min_frac` sont retirés
/// Retourne (est_négatif, texte)
fn format_unsigned(amount: f64, min_frac: usize, max_frac: usize) -> (bool, String) {
    let rounded = format!("{:.*}", max_frac, amount.abs());

    let (integer, fraction) = match rounded.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (rounded.clone(), String::new()),
    };

    let mut fraction = fraction;
    while fraction.len() > min_frac && fraction.ends_with('0') {
        fraction.pop();
    }

    // -0.00 s'affiche 0.00
    let is_zero = rounded.chars().all(|c| c == '0' || c == '.');
    let negative = amount < 0.0 && !is_zero;

    let grouped = group_thousands(&integer);
    let text = if fraction.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, fraction)
    };

    (negative, text)
}

/// Formate un nombre sans symbole, avec séparateurs ("1,234.5")
pub fn format_number(amount: f64, min_frac: usize, max_frac: usize) -> String {
    let (negative, text) = format_unsigned(amount, min_frac, max_frac);
    if negative {
        format!("-{}", text)
    } else {
        text
    }
}

/// Formate un montant dans une devise
///
/// # Arguments
/// * `fraction_digits` - Some(n) : exactement n décimales ; None : 2 à 6
///
/// # Exemples
/// - format_currency(1234.5, "usd", None) -> "$1,234.50"
/// - format_currency(0.000123, "usd", None) -> "$0.000123"
/// - format_currency(-3.0, "eur", Some(2)) -> "-€3.00"
pub fn format_currency(amount: f64, currency: &str, fraction_digits: Option<usize>) -> String {
    let (min_frac, max_frac) = match fraction_digits {
        Some(n) => (n, n),
        None => (2, 6),
    };

    let (negative, text) = format_unsigned(amount, min_frac, max_frac);
    let sign = if negative { "-" } else { "" };
    format!("{}{}{}", sign, currency_prefix(currency), text)
}

/// Abrège une capitalisation (ou un volume) : T / B / M, sinon montant entier
pub fn format_market_cap(value: f64, currency: &str) -> String {
    if value >= 1e12 {
        format!("{}T", format_currency(value / 1e12, currency, Some(2)))
    } else if value >= 1e9 {
        format!("{}B", format_currency(value / 1e9, currency, Some(2)))
    } else if value >= 1e6 {
        format!("{}M", format_currency(value / 1e6, currency, Some(2)))
    } else {
        format_currency(value, currency, Some(0))
    }
}

/// Prix d'une crypto avec une précision adaptée à sa magnitude
///
/// - >= 1     : 2 décimales ($45,234.56)
/// - >= 0.01  : 4 décimales ($0.4850)
/// - sinon    : nombre brut, 8 à 12 décimales (0.00001234)
pub fn format_crypto_price(price: f64, currency: &str) -> String {
    if price >= 1.0 {
        format_currency(price, currency, Some(2))
    } else if price >= 0.01 {
        format_currency(price, currency, Some(4))
    } else {
        format_number(price, 8, 12)
    }
}

/// Variation en pourcentage avec signe et tendance
///
/// Seule une variation strictement positive reçoit le "+" et la flèche montante
pub fn format_change(percent: f64) -> PriceChange {
    if percent > 0.0 {
        PriceChange {
            text: format!("+{:.2}%", percent),
            trend: Trend::Up,
        }
    } else {
        PriceChange {
            text: format!("{}%", format_number(percent, 2, 2)),
            trend: Trend::Down,
        }
    }
}

/// Pourcentage simple ("52.10%"), "--" si absent
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => PLACEHOLDER.to_string(),
    }
}

/// Offre en circulation : "19,500,000 BTC"
pub fn format_supply(amount: f64, symbol: &str) -> String {
    format!("{} {}", format_number(amount, 0, 2), symbol.to_uppercase())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_cap_bands() {
        assert_eq!(format_market_cap(1_500_000_000_000.0, "usd"), "$1.50T");
        assert_eq!(format_market_cap(2_300_000_000.0, "usd"), "$2.30B");
        assert_eq!(format_market_cap(48_456_789.0, "usd"), "$48.46M");
        assert_eq!(format_market_cap(450_000.0, "usd"), "$450,000");
    }

    #[test]
    fn test_market_cap_thresholds_are_inclusive() {
        assert_eq!(format_market_cap(1e6, "usd"), "$1.00M");
        assert_eq!(format_market_cap(1e9, "usd"), "$1.00B");
        assert_eq!(format_market_cap(1e12, "usd"), "$1.00T");
        assert_eq!(format_market_cap(999_999.0, "usd"), "$999,999");
    }

    #[test]
    fn test_currency_default_precision() {
        assert_eq!(format_currency(45234.56, "usd", None), "$45,234.56");
        assert_eq!(format_currency(0.485, "usd", None), "$0.485");
        assert_eq!(format_currency(3.0, "usd", None), "$3.00");
        assert_eq!(format_currency(0.000123, "usd", None), "$0.000123");
    }

    #[test]
    fn test_currency_negative_and_symbols() {
        assert_eq!(format_currency(-1234.5, "usd", Some(2)), "-$1,234.50");
        assert_eq!(format_currency(10.0, "EUR", Some(2)), "€10.00");
        assert_eq!(format_currency(10.0, "chf", Some(0)), "CHF 10");
    }

    #[test]
    fn test_crypto_price_bands() {
        assert_eq!(format_crypto_price(45234.56, "usd"), "$45,234.56");
        assert_eq!(format_crypto_price(0.485, "usd"), "$0.4850");
        assert_eq!(format_crypto_price(0.005, "usd"), "0.00500000");
    }

    #[test]
    fn test_change_sign() {
        let up = format_change(2.45);
        assert_eq!(up.text, "+2.45%");
        assert_eq!(up.trend, Trend::Up);
        assert_eq!(up.display(), "▲ +2.45%");

        let down = format_change(-1.23);
        assert_eq!(down.text, "-1.23%");
        assert_eq!(down.trend, Trend::Down);

        let flat = format_change(0.0);
        assert_eq!(flat.text, "0.00%");
        assert_eq!(flat.trend, Trend::Down);
        assert!(!flat.text.starts_with('+'));
    }

    #[test]
    fn test_supply_and_percent() {
        assert_eq!(format_supply(19_500_000.0, "btc"), "19,500,000 BTC");
        assert_eq!(format_percent(Some(52.1)), "52.10%");
        assert_eq!(format_percent(None), "--");
    }
}
