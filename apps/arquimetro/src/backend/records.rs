//! # Loose Backend Records
//!
//! The hosted backend returns rows as plain JSON objects: ids may arrive as
//! numbers or numeric strings, field names as `snake_case` or `camelCase`,
//! and optional columns may be missing or `null`. This module converts them
//! into typed records. Anything malformed fails with `Validation` naming the
//! record kind and field.

use arquimetro_core::{
    ArquimetroError, Catalog, CatalogParts, Category, CategoryId, DeficiencySet, EntityKind, Level,
    Question, QuestionId, ResponseOption, ResponseOptionId, Subcategory, SubcategoryId, Weight,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// =============================================================================
// FIELD ACCESS
// =============================================================================

/// One JSON object read as a record of `kind`.
struct Fields<'a> {
    kind: EntityKind,
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(kind: EntityKind, value: &'a Value) -> Result<Self, ArquimetroError> {
        let object = value.as_object().ok_or_else(|| {
            ArquimetroError::validation(kind, "record", "expected a JSON object")
        })?;
        Ok(Self { kind, object })
    }

    /// First present, non-null value among `names`.
    fn lookup(&self, names: &[&str]) -> Option<&'a Value> {
        names
            .iter()
            .filter_map(|name| self.object.get(*name))
            .find(|v| !v.is_null())
    }

    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> ArquimetroError {
        ArquimetroError::validation(self.kind, field, reason)
    }

    fn id(&self, field: &'static str, names: &[&str]) -> Result<u64, ArquimetroError> {
        match self.lookup(names) {
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| self.invalid(field, format!("'{}' is not a valid id", n))),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| self.invalid(field, format!("'{}' is not a valid id", s))),
            Some(_) => Err(self.invalid(field, "expected a number")),
            None => Err(self.invalid(field, "missing")),
        }
    }

    fn int(&self, field: &'static str, names: &[&str]) -> Result<i64, ArquimetroError> {
        match self.lookup(names) {
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| self.invalid(field, format!("'{}' is not an integer", n))),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| self.invalid(field, format!("'{}' is not an integer", s))),
            Some(_) => Err(self.invalid(field, "expected an integer")),
            None => Err(self.invalid(field, "missing")),
        }
    }

    fn sort_order(&self) -> Result<i32, ArquimetroError> {
        if self.lookup(&["sort_order", "sortOrder", "order"]).is_none() {
            return Ok(0);
        }
        let raw = self.int("sort_order", &["sort_order", "sortOrder", "order"])?;
        i32::try_from(raw).map_err(|_| self.invalid("sort_order", "out of range"))
    }

    fn text(&self, field: &'static str, names: &[&str]) -> Result<String, ArquimetroError> {
        match self.lookup(names) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.invalid(field, "expected a string")),
            None => Err(self.invalid(field, "missing")),
        }
    }

    fn optional_text(&self, field: &'static str, names: &[&str]) -> Result<String, ArquimetroError> {
        match self.lookup(names) {
            None => Ok(String::new()),
            Some(_) => self.text(field, names),
        }
    }

    fn weight(&self) -> Result<Weight, ArquimetroError> {
        match self.lookup(&["weight"]) {
            None => Ok(Weight::default()),
            Some(Value::Number(n)) => n.to_string().parse(),
            Some(Value::String(s)) => s.parse(),
            Some(_) => Err(self.invalid("weight", "expected a number")),
        }
    }

    /// Tags as an array of strings or one comma-separated string.
    fn tags(&self) -> Result<DeficiencySet, ArquimetroError> {
        let names = ["deficiency_types", "deficiencyTypes", "deficiencies"];
        let mut tags = DeficiencySet::new();
        match self.lookup(&names) {
            None => {}
            Some(Value::Array(items)) => {
                for item in items {
                    let code = item
                        .as_str()
                        .ok_or_else(|| self.invalid("deficiency_types", "expected strings"))?;
                    tags.insert(code.parse().map_err(|_| {
                        self.invalid(
                            "deficiency_types",
                            format!("unknown deficiency type '{}'", code),
                        )
                    })?);
                }
            }
            Some(Value::String(list)) => {
                for code in list.split(',').filter(|c| !c.trim().is_empty()) {
                    tags.insert(code.parse().map_err(|_| {
                        self.invalid(
                            "deficiency_types",
                            format!("unknown deficiency type '{}'", code.trim()),
                        )
                    })?);
                }
            }
            Some(_) => return Err(self.invalid("deficiency_types", "expected a list")),
        }
        Ok(tags)
    }
}

// =============================================================================
// RECORD CONVERSION
// =============================================================================

pub fn category_from_json(value: &Value) -> Result<Category, ArquimetroError> {
    let f = Fields::new(EntityKind::Category, value)?;
    Ok(Category {
        id: CategoryId(f.id("id", &["id"])?),
        title: f.text("title", &["title", "name"])?,
        description: f.optional_text("description", &["description"])?,
        icon: f.optional_text("icon", &["icon"])?,
        color: f.optional_text("color", &["color", "colour"])?,
        sort_order: f.sort_order()?,
    })
}

pub fn subcategory_from_json(value: &Value) -> Result<Subcategory, ArquimetroError> {
    let f = Fields::new(EntityKind::Subcategory, value)?;
    Ok(Subcategory {
        id: SubcategoryId(f.id("id", &["id"])?),
        title: f.text("title", &["title", "name"])?,
        category_id: CategoryId(f.id("category_id", &["category_id", "categoryId"])?),
        sort_order: f.sort_order()?,
    })
}

pub fn question_from_json(value: &Value) -> Result<Question, ArquimetroError> {
    let f = Fields::new(EntityKind::Question, value)?;
    Ok(Question {
        id: QuestionId(f.id("id", &["id"])?),
        text: f.text("text", &["text", "question", "title"])?,
        subcategory_id: SubcategoryId(
            f.id("subcategory_id", &["subcategory_id", "subcategoryId"])?,
        ),
        deficiency_types: f.tags()?,
        sort_order: f.sort_order()?,
    })
}

pub fn response_option_from_json(value: &Value) -> Result<ResponseOption, ArquimetroError> {
    let f = Fields::new(EntityKind::ResponseOption, value)?;
    let raw_level = f.int("level", &["level"])?;
    let level = u8::try_from(raw_level)
        .map_err(|_| f.invalid("level", format!("level {} is out of range", raw_level)))
        .and_then(Level::new)?;
    Ok(ResponseOption {
        id: ResponseOptionId(f.id("id", &["id"])?),
        question_id: QuestionId(f.id("question_id", &["question_id", "questionId"])?),
        level,
        label: f.text("label", &["label", "text"])?,
        explanation: f.optional_text("explanation", &["explanation"])?,
        feedback: f.text("feedback", &["feedback"])?,
        weight: f.weight()?,
        deficiency_types: f.tags()?,
    })
}

fn rows<'a>(
    root: &'a Map<String, Value>,
    names: &[&str],
) -> Result<&'a [Value], ArquimetroError> {
    match names.iter().find_map(|name| root.get(*name)) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ArquimetroError::validation(
            EntityKind::Category,
            "catalog",
            format!("'{}' must be an array", names[0]),
        )),
    }
}

/// Convert a `{categories, subcategories, questions, responseOptions}`
/// payload into a validated catalog.
pub fn catalog_from_json(value: &Value) -> Result<Catalog, ArquimetroError> {
    let root = value.as_object().ok_or_else(|| {
        ArquimetroError::validation(EntityKind::Category, "catalog", "expected a JSON object")
    })?;

    let parts = CatalogParts {
        categories: rows(root, &["categories"])?
            .iter()
            .map(category_from_json)
            .collect::<Result<_, _>>()?,
        subcategories: rows(root, &["subcategories"])?
            .iter()
            .map(subcategory_from_json)
            .collect::<Result<_, _>>()?,
        questions: rows(root, &["questions"])?
            .iter()
            .map(question_from_json)
            .collect::<Result<_, _>>()?,
        response_options: rows(root, &["response_options", "responseOptions"])?
            .iter()
            .map(response_option_from_json)
            .collect::<Result<_, _>>()?,
    };

    Catalog::from_parts(parts)
}

/// Convert recorded responses: either an array of
/// `{question_id, response_option_id}` rows or a `{question: option}` map.
pub fn responses_from_json(
    value: &Value,
) -> Result<BTreeMap<QuestionId, ResponseOptionId>, ArquimetroError> {
    let mut responses = BTreeMap::new();
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                let f = Fields::new(EntityKind::Evaluation, item)?;
                let question = f.id("question_id", &["question_id", "questionId"])?;
                let option = f.id(
                    "response_option_id",
                    &["response_option_id", "responseOptionId", "option_id"],
                )?;
                responses.insert(QuestionId(question), ResponseOptionId(option));
            }
        }
        Value::Object(map) => {
            for (key, option) in map {
                let question = key.trim().parse().map_err(|_| {
                    ArquimetroError::validation(
                        EntityKind::Evaluation,
                        "question_id",
                        format!("'{}' is not a valid id", key),
                    )
                })?;
                let wrapper = serde_json::json!({ "id": option });
                let option = Fields::new(EntityKind::Evaluation, &wrapper)?
                    .id("response_option_id", &["id"])?;
                responses.insert(QuestionId(question), ResponseOptionId(option));
            }
        }
        _ => {
            return Err(ArquimetroError::validation(
                EntityKind::Evaluation,
                "responses",
                "expected an array or an object",
            ));
        }
    }
    Ok(responses)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use arquimetro_core::DeficiencyType;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "categories": [{"id": "1", "title": "Estratégia", "description": null, "sortOrder": 2}],
            "subcategories": [{"id": 2, "title": "Política", "categoryId": 1}],
            "questions": [{"id": 3, "text": "Existe política?", "subcategory_id": "2"}],
            "responseOptions": [
                {"id": 4, "questionId": 3, "level": 2, "label": "Em elaboração",
                 "feedback": "Aprove", "weight": 2.5, "deficiencyTypes": ["tecnica"]},
                {"id": 5, "question_id": 3, "level": "5", "label": "Sim",
                 "feedback": "Mantenha", "deficiency_types": "comportamental, ferramental"}
            ]
        })
    }

    #[test]
    fn test_loose_catalog_is_typed() {
        let catalog = catalog_from_json(&sample()).expect("catalog");
        let stats = catalog.stats();
        assert_eq!(stats.categories, 1);
        assert_eq!(stats.response_options, 2);

        let category = catalog.category(CategoryId(1)).expect("category");
        assert_eq!(category.sort_order, 2);
        assert!(category.description.is_empty());

        let low = catalog.response_option(ResponseOptionId(4)).expect("option");
        assert_eq!(low.weight.hundredths(), 250);
        assert!(low.deficiency_types.contains(DeficiencyType::Tecnica));

        let high = catalog.response_option(ResponseOptionId(5)).expect("option");
        assert_eq!(high.weight, Weight::default());
        assert_eq!(high.deficiency_types.len(), 2);
        assert_eq!(catalog.next_id(), 6);
    }

    #[test]
    fn test_missing_field_is_validation_error() {
        let value = json!({"categories": [{"id": 1}]});
        match catalog_from_json(&value) {
            Err(ArquimetroError::Validation { entity, field, .. }) => {
                assert_eq!(entity, EntityKind::Category);
                assert_eq!(field, "title");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_level_and_tag_rejected() {
        let mut value = sample();
        value["responseOptions"][0]["level"] = json!(9);
        assert!(matches!(
            catalog_from_json(&value),
            Err(ArquimetroError::Validation { .. })
        ));

        let mut value = sample();
        value["responseOptions"][0]["deficiencyTypes"] = json!(["financeira"]);
        assert!(matches!(
            catalog_from_json(&value),
            Err(ArquimetroError::Validation {
                field: "deficiency_types",
                ..
            })
        ));
    }

    #[test]
    fn test_orphan_rejected() {
        let mut value = sample();
        value["questions"][0]["subcategory_id"] = json!(99);
        assert!(matches!(
            catalog_from_json(&value),
            Err(ArquimetroError::Validation { .. })
        ));
    }

    #[test]
    fn test_responses_rows_and_map() {
        let rows = json!([{"questionId": 3, "responseOptionId": "4"}]);
        let map = json!({"3": 4});
        let expected = BTreeMap::from([(QuestionId(3), ResponseOptionId(4))]);
        assert_eq!(responses_from_json(&rows).expect("rows"), expected);
        assert_eq!(responses_from_json(&map).expect("map"), expected);
        assert!(responses_from_json(&json!("x")).is_err());
    }
}
