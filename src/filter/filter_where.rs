use serde_json::Value;

use super::error::FilterError;
use super::filter::Filter;
use super::types::{FilterOp, FilterWhereInfo, SqlParam};

/// Compiles a [`Filter`] into a WHERE clause over a JSONB `doc` column.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(filter: &Filter, starting_param_index: usize) -> Result<(String, Vec<SqlParam>), FilterError> {
        filter.validate()?;
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build(filter);
        Ok((sql, filter_where.param_values))
    }

    fn build(&mut self, filter: &Filter) -> String {
        match filter {
            Filter::All => "1=1".to_string(),
            Filter::Where(info) => self.build_sql_condition(info),
            Filter::Or(filters) => self.join(filters, " OR ", "1=0"),
        }
    }

    fn join(&mut self, filters: &[Filter], joiner: &str, empty: &str) -> String {
        if filters.is_empty() {
            return empty.to_string();
        }
        let parts: Vec<String> = filters.iter().map(|f| format!("({})", self.build(f))).collect();
        parts.join(joiner)
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        // Field names were validated as identifiers, so inlining them is safe.
        let json_path = format!("doc->'{}'", condition.field);
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() {
                    format!("({} IS NULL OR {} = 'null'::jsonb)", json_path, json_path)
                } else {
                    let p = self.param(SqlParam::Json(condition.data.clone()));
                    format!("{} = {}::jsonb", json_path, p)
                }
            }
            FilterOp::ILike => {
                let needle = condition.data.as_str().unwrap_or_default();
                let p = self.param(SqlParam::Text(format!("%{}%", escape_like(needle))));
                format!("doc->>'{}' ILIKE {}", condition.field, p)
            }
            FilterOp::In => {
                let values = match &condition.data {
                    Value::Array(values) => values.clone(),
                    other => vec![other.clone()],
                };
                if values.is_empty() {
                    return "1=0".to_string();
                }
                let params: Vec<String> = values
                    .into_iter()
                    .map(|v| format!("{}::jsonb", self.param(SqlParam::Json(v))))
                    .collect();
                format!("{} IN ({})", json_path, params.join(", "))
            }
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Escape LIKE metacharacters so user input matches literally (backslash is the default escape).
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn eq_binds_json_params_in_order() {
        let f = Filter::or(vec![Filter::eq("department1", 4), Filter::eq("department2", 4)]);
        let (sql, params) = FilterWhere::generate(&f, 0).unwrap();
        assert_eq!(sql, "(doc->'department1' = $1::jsonb) OR (doc->'department2' = $2::jsonb)");
        assert_eq!(params, vec![SqlParam::Json(json!(4)), SqlParam::Json(json!(4))]);
    }

    #[test]
    fn eq_null_checks_missing_or_json_null() {
        let (sql, params) = FilterWhere::generate(&Filter::eq("area", Value::Null), 0).unwrap();
        assert_eq!(sql, "(doc->'area' IS NULL OR doc->'area' = 'null'::jsonb)");
        assert!(params.is_empty());
    }

    #[test]
    fn ilike_escapes_wildcards() {
        let (sql, params) = FilterWhere::generate(&Filter::ilike("name", "50%_off"), 2).unwrap();
        assert_eq!(sql, "doc->>'name' ILIKE $3");
        assert_eq!(params, vec![SqlParam::Text("%50\\%\\_off%".to_string())]);
    }

    #[test]
    fn in_binds_one_param_per_value() {
        let f = Filter::is_in("areaId", vec![json!("tech"), json!("corp")]);
        let (sql, params) = FilterWhere::generate(&f, 0).unwrap();
        assert_eq!(sql, "doc->'areaId' IN ($1::jsonb, $2::jsonb)");
        assert_eq!(params, vec![SqlParam::Json(json!("tech")), SqlParam::Json(json!("corp"))]);
    }

    #[test]
    fn empty_in_and_or_never_match() {
        let (sql, _) = FilterWhere::generate(&Filter::is_in("managerId", vec![]), 0).unwrap();
        assert_eq!(sql, "1=0");
        let (sql, _) = FilterWhere::generate(&Filter::or(vec![]), 0).unwrap();
        assert_eq!(sql, "1=0");
    }

    #[test]
    fn invalid_field_is_rejected() {
        assert!(FilterWhere::generate(&Filter::eq("x'); DROP TABLE areas; --", 1), 0).is_err());
    }
}
