//! Financial product snapshots attached to candidates.
//!
//! A product is stored as opaque text holding a JSON object. Nothing here
//! fails on bad input: malformed text aggregates as an empty object.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

pub const NOT_FOUND: &str = "No encontrado";

pub const PRODUCT_KEYS: [&str; 18] = [
    "nombre_titular",
    "numero_tarjeta",
    "fecha_estado_cuenta",
    "cupo_total",
    "cupo_utilizado",
    "cupo_disponible",
    "cupo_total_avance_efectivo",
    "cupo_utilizado_avance_efectivo",
    "cupo_disponible_avance_efectivo",
    "tasas_interes_vigente_rotativo",
    "tasas_interes_vigente_compra_cuotas",
    "tasas_interes_vigente_avance_cuotas",
    "cae_rotativo",
    "cae_compra_cuotas",
    "cae_avance_cuotas",
    "fecha_pagar_hasta",
    "monto_total_facturado",
    "monto_minimo_pagar",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y"];

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedProduct {
    Valid(Map<String, JsonValue>),
    Malformed,
    Missing,
}

impl ParsedProduct {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return ParsedProduct::Missing;
        };
        match serde_json::from_str::<JsonValue>(raw) {
            Ok(JsonValue::Object(map)) => ParsedProduct::Valid(unwrap_envelope(map)),
            Ok(_) | Err(_) => ParsedProduct::Malformed,
        }
    }

    pub fn fields(&self) -> Option<&Map<String, JsonValue>> {
        match self {
            ParsedProduct::Valid(map) => Some(map),
            _ => None,
        }
    }
}

/// Extraction answers sometimes come wrapped as `{"producto": {...}}`.
fn unwrap_envelope(mut map: Map<String, JsonValue>) -> Map<String, JsonValue> {
    if map.len() == 1 && matches!(map.get("producto"), Some(JsonValue::Object(_))) {
        if let Some(JsonValue::Object(inner)) = map.remove("producto") {
            return inner;
        }
    }
    map
}

/// Fills every known key, using the "No encontrado" placeholder for gaps.
pub fn normalize_product(fields: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    let mut normalized = Map::new();
    for key in PRODUCT_KEYS {
        let value = fields
            .get(key)
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| JsonValue::String(NOT_FOUND.to_string()));
        normalized.insert(key.to_string(), value);
    }
    normalized
}

/// `Number(x) || 0`: anything that isn't a finite number counts as zero.
pub fn coerce_number(value: Option<&JsonValue>) -> f64 {
    let number = match value {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(JsonValue::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(JsonValue::Bool(true)) => 1.0,
        _ => 0.0,
    };
    if number.is_finite() {
        number
    } else {
        0.0
    }
}

fn non_empty_text(value: Option<&JsonValue>) -> Option<String> {
    let text = match value? {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() || text.eq_ignore_ascii_case(NOT_FOUND) {
        None
    } else {
        Some(text)
    }
}

pub fn parse_statement_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

#[derive(Debug, Default)]
struct LatestDate {
    raw: Option<String>,
    parsed: Option<NaiveDate>,
}

impl LatestDate {
    /// Keeps the chronologically latest date; when either side can't be
    /// parsed the most recently seen value wins.
    fn offer(&mut self, candidate: String) {
        let parsed = parse_statement_date(&candidate);
        let replace = match (self.parsed, parsed) {
            (Some(current), Some(next)) => next >= current,
            _ => true,
        };
        if replace {
            self.raw = Some(candidate);
            self.parsed = parsed;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductTotals {
    pub cupo_total: f64,
    pub cupo_utilizado: f64,
    pub cupo_disponible: f64,
    pub monto_total_facturado: f64,
    pub monto_minimo_pagar: f64,
    pub fecha_estado_cuenta: Option<String>,
    pub fecha_pagar_hasta: Option<String>,
    pub nombre_titular: Option<String>,
    pub numero_tarjeta: Option<String>,
    pub products: usize,
    pub malformed: usize,
}

impl ProductTotals {
    pub fn aggregate<'a, I>(raw_products: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut totals = ProductTotals::default();
        let mut statement_date = LatestDate::default();
        let mut due_date = LatestDate::default();
        let empty = Map::new();

        for raw in raw_products {
            let parsed = ParsedProduct::parse(raw);
            match &parsed {
                ParsedProduct::Missing => continue,
                ParsedProduct::Malformed => {
                    tracing::debug!("Skipping malformed product record");
                    totals.malformed += 1;
                }
                ParsedProduct::Valid(_) => totals.products += 1,
            }
            let fields = parsed.fields().unwrap_or(&empty);

            totals.cupo_total += coerce_number(fields.get("cupo_total"));
            totals.cupo_utilizado += coerce_number(fields.get("cupo_utilizado"));
            totals.cupo_disponible += coerce_number(fields.get("cupo_disponible"));
            totals.monto_total_facturado += coerce_number(fields.get("monto_total_facturado"));
            totals.monto_minimo_pagar += coerce_number(fields.get("monto_minimo_pagar"));

            if let Some(date) = non_empty_text(fields.get("fecha_estado_cuenta")) {
                statement_date.offer(date);
            }
            if let Some(date) = non_empty_text(fields.get("fecha_pagar_hasta")) {
                due_date.offer(date);
            }
            if let Some(holder) = non_empty_text(fields.get("nombre_titular")) {
                totals.nombre_titular = Some(holder);
            }
            if let Some(card) = non_empty_text(fields.get("numero_tarjeta")) {
                totals.numero_tarjeta = Some(card);
            }
        }

        totals.fecha_estado_cuenta = statement_date.raw;
        totals.fecha_pagar_hasta = due_date.raw;
        totals
    }

    /// Share of the credit line in use, 0 when there is no credit line.
    pub fn utilization_percent(&self) -> f64 {
        if self.cupo_total == 0.0 {
            return 0.0;
        }
        let percent = self.cupo_utilizado / self.cupo_total * 100.0;
        if percent.is_finite() {
            percent
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sums_credit_lines() {
        let a = json!({"cupo_total": 100, "cupo_utilizado": 40}).to_string();
        let b = json!({"cupo_total": 200, "cupo_utilizado": 60}).to_string();
        let totals = ProductTotals::aggregate([Some(a.as_str()), Some(b.as_str())]);
        assert_eq!(totals.cupo_total, 300.0);
        assert_eq!(totals.cupo_utilizado, 100.0);
        assert_eq!(totals.products, 2);
    }

    #[test]
    fn malformed_records_count_as_empty() {
        let good = json!({"cupo_total": "1500", "cupo_disponible": 500}).to_string();
        let totals = ProductTotals::aggregate([
            Some("{not json"),
            Some(good.as_str()),
            Some("[1, 2, 3]"),
            None,
            Some(""),
        ]);
        assert_eq!(totals.cupo_total, 1500.0);
        assert_eq!(totals.cupo_disponible, 500.0);
        assert_eq!(totals.products, 1);
        assert_eq!(totals.malformed, 2);
    }

    #[test]
    fn non_numeric_values_coerce_to_zero() {
        assert_eq!(coerce_number(Some(&json!("No encontrado"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("$1.234.567"))), 0.0);
        assert_eq!(coerce_number(Some(&json!(" 250 "))), 250.0);
        assert_eq!(coerce_number(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("inf"))), 0.0);
        assert_eq!(coerce_number(Some(&json!(null))), 0.0);
        assert_eq!(coerce_number(Some(&json!({"x": 1}))), 0.0);
        assert_eq!(coerce_number(None), 0.0);
    }

    #[test]
    fn zero_credit_line_has_zero_utilization() {
        let totals = ProductTotals {
            cupo_utilizado: 50.0,
            ..Default::default()
        };
        assert_eq!(totals.utilization_percent(), 0.0);
    }

    #[test]
    fn utilization_is_a_percentage() {
        let a = json!({"cupo_total": 400, "cupo_utilizado": 100}).to_string();
        let totals = ProductTotals::aggregate([Some(a.as_str())]);
        assert_eq!(totals.utilization_percent(), 25.0);
    }

    #[test]
    fn keeps_latest_statement_date_regardless_of_order() {
        let newer = json!({"fecha_estado_cuenta": "15/03/2024"}).to_string();
        let older = json!({"fecha_estado_cuenta": "15/01/2024"}).to_string();
        let totals = ProductTotals::aggregate([Some(newer.as_str()), Some(older.as_str())]);
        assert_eq!(totals.fecha_estado_cuenta.as_deref(), Some("15/03/2024"));
    }

    #[test]
    fn placeholder_dates_and_names_are_ignored() {
        let first = json!({"fecha_pagar_hasta": "2024-04-05", "nombre_titular": "Ana"}).to_string();
        let second =
            json!({"fecha_pagar_hasta": "No encontrado", "nombre_titular": ""}).to_string();
        let totals = ProductTotals::aggregate([Some(first.as_str()), Some(second.as_str())]);
        assert_eq!(totals.fecha_pagar_hasta.as_deref(), Some("2024-04-05"));
        assert_eq!(totals.nombre_titular.as_deref(), Some("Ana"));
    }

    #[test]
    fn unparseable_dates_fall_back_to_iteration_order() {
        let a = json!({"fecha_pagar_hasta": "05 abril"}).to_string();
        let b = json!({"fecha_pagar_hasta": "10 mayo"}).to_string();
        let totals = ProductTotals::aggregate([Some(a.as_str()), Some(b.as_str())]);
        assert_eq!(totals.fecha_pagar_hasta.as_deref(), Some("10 mayo"));
    }

    #[test]
    fn envelope_is_unwrapped() {
        let wrapped = json!({"producto": {"cupo_total": 10}}).to_string();
        let parsed = ParsedProduct::parse(Some(wrapped.as_str()));
        assert_eq!(parsed.fields().and_then(|f| f.get("cupo_total")), Some(&json!(10)));
    }

    #[test]
    fn normalize_fills_placeholders() {
        let mut fields = Map::new();
        fields.insert("cupo_total".into(), json!(900));
        fields.insert("cae_rotativo".into(), JsonValue::Null);
        let normalized = normalize_product(&fields);
        assert_eq!(normalized.len(), PRODUCT_KEYS.len());
        assert_eq!(normalized["cupo_total"], json!(900));
        assert_eq!(normalized["cae_rotativo"], json!(NOT_FOUND));
    }

    #[test]
    fn non_object_envelope_is_kept() {
        let parsed = ParsedProduct::parse(Some(r#"{"producto": "x"}"#));
        assert_eq!(parsed.fields().and_then(|f| f.get("producto")), Some(&json!("x")));
    }
}
