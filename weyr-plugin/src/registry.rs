//! Plugin Registry

use crate::{FunctionPlugin, FunctionMeta};
use crate::EvalContext;
use weyr_core::{Value, WeyrError};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Central plugin registry
pub struct PluginRegistry {
    functions: HashMap<String, Arc<dyn FunctionPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    pub fn with_function<F: FunctionPlugin + 'static>(mut self, f: F) -> Self {
        let name = f.meta().name.to_lowercase();
        self.functions.insert(name, Arc::new(f));
        self
    }

    pub fn get_function(&self, name: &str) -> Option<&dyn FunctionPlugin> {
        self.functions.get(&name.to_lowercase()).map(|f| f.as_ref())
    }

    pub fn call_function(&self, name: &str, args: &[Value], ctx: &EvalContext) -> Value {
        match self.get_function(name) {
            Some(f) => {
                if let Err(e) = f.meta().check_arity(args.len()) {
                    return Value::Error(e);
                }
                tracing::trace!(function = name, argc = args.len(), "calling function");
                let result = f.call(args, ctx);
                if let Value::Error(ref e) = result {
                    tracing::debug!(function = name, code = %e.code, "function returned error");
                }
                result
            }
            None => {
                // Find similar function names for better error message
                let similar = self.find_similar_functions(name);
                let mut err = WeyrError::undefined_func(name);
                if !similar.is_empty() {
                    let suggestions: Vec<&str> = similar.iter().take(5).map(|s| s.as_str()).collect();
                    err = err.with_suggestion(format!(
                        "Similar: {}. Use list_functions for full list.",
                        suggestions.join(", ")
                    ));
                }
                Value::Error(err)
            }
        }
    }

    /// Find function names similar to the given name (for error suggestions)
    fn find_similar_functions(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self.functions.keys()
            .filter_map(|func_name| {
                let score = Self::similarity_score(&name_lower, func_name);
                if score > 0 {
                    Some((func_name.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        // Higher score first, then alphabetical for stable output
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        score += common * 2;

        let len_diff = (query.len() as i32 - candidate.len() as i32).unsigned_abs() as usize;
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        score
    }

    pub fn help(&self, name: Option<&str>) -> Value {
        match name {
            Some(n) => self.help_for(n),
            None => self.general_help(),
        }
    }

    fn help_for(&self, name: &str) -> Value {
        match self.functions.get(&name.to_lowercase()) {
            Some(f) => Value::Object(Self::function_to_help(f.meta())),
            None => Value::Error(WeyrError::undefined_func(name)),
        }
    }

    fn general_help(&self) -> Value {
        let mut funcs_by_cat: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, f) in &self.functions {
            let cat = f.meta().category.to_string();
            funcs_by_cat.entry(cat).or_default().push(name.clone());
        }

        let mut help = BTreeMap::new();
        help.insert("functions".to_string(),
            Value::Object(funcs_by_cat.into_iter()
                .map(|(k, mut v)| {
                    v.sort();
                    (k, Value::List(v.into_iter().map(Value::Text).collect()))
                })
                .collect()));
        help.insert("usage".to_string(),
            Value::Text("Call help('function_name') for detailed help.".to_string()));
        Value::Object(help)
    }

    fn function_to_help(meta: FunctionMeta) -> BTreeMap<String, Value> {
        let mut help = BTreeMap::new();
        help.insert("name".to_string(), Value::Text(meta.name.to_string()));
        help.insert("description".to_string(), Value::Text(meta.description.to_string()));
        help.insert("usage".to_string(), Value::Text(meta.usage.to_string()));
        help.insert("returns".to_string(), Value::Text(meta.returns.to_string()));
        help.insert("category".to_string(), Value::Text(meta.category.to_string()));
        help.insert("args".to_string(), Value::List(
            meta.args.iter().map(|a| {
                let mut arg = BTreeMap::new();
                arg.insert("name".to_string(), Value::Text(a.name.to_string()));
                arg.insert("type".to_string(), Value::Text(a.typ.to_string()));
                arg.insert("description".to_string(), Value::Text(a.description.to_string()));
                arg.insert("optional".to_string(), Value::Bool(a.optional));
                Value::Object(arg)
            }).collect()
        ));
        help.insert("examples".to_string(), Value::List(
            meta.examples.iter().map(|e| Value::Text(e.to_string())).collect()
        ));
        help.insert("related".to_string(), Value::List(
            meta.related.iter().map(|r| Value::Text(r.to_string())).collect()
        ));
        help
    }

    /// List functions sorted by name, optionally restricted to one category.
    /// A category also matches its subcategories ("matrix" covers "matrix/ops").
    pub fn list_functions(&self, category: Option<&str>) -> Value {
        let in_category = |cat: &str, wanted: &str| {
            cat == wanted || cat.strip_prefix(wanted).is_some_and(|rest| rest.starts_with('/'))
        };
        let mut metas: Vec<FunctionMeta> = self.functions.values()
            .map(|f| f.meta())
            .filter(|m| category.map_or(true, |c| in_category(m.category, c)))
            .collect();
        metas.sort_by_key(|m| m.name);

        Value::List(metas.into_iter().map(|meta| {
            let mut obj = BTreeMap::new();
            obj.insert("name".to_string(), Value::Text(meta.name.to_string()));
            obj.insert("description".to_string(), Value::Text(meta.description.to_string()));
            obj.insert("usage".to_string(), Value::Text(meta.usage.to_string()));
            obj.insert("category".to_string(), Value::Text(meta.category.to_string()));
            Value::Object(obj)
        }).collect())
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArgMeta;
    use weyr_core::{codes, Rational};

    struct DoubleFn;

    static DOUBLE_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value to double")];

    impl FunctionPlugin for DoubleFn {
        fn meta(&self) -> FunctionMeta {
            FunctionMeta {
                name: "double",
                description: "Multiply by two",
                usage: "double(x)",
                args: &DOUBLE_ARGS,
                returns: "Number",
                examples: &[],
                category: "test",
                related: &[],
            }
        }

        fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
            match args.first().map(Value::to_number) {
                Some(Ok(n)) => Value::Number(n.add(&n)),
                Some(Err(e)) => Value::Error(e),
                None => Value::Error(WeyrError::arg_count("double", 1, 0)),
            }
        }
    }

    fn registry() -> Arc<PluginRegistry> {
        Arc::new(PluginRegistry::new().with_function(DoubleFn))
    }

    #[test]
    fn test_call_registered_function() {
        let reg = registry();
        let ctx = EvalContext::new(reg.clone());
        let result = reg.call_function("DOUBLE", &[Value::Text("1/3".to_string())], &ctx);
        assert_eq!(result.as_number(), Some(&Rational::from_ratio(2, 3).unwrap()));
    }

    #[test]
    fn test_unknown_function_suggests_similar() {
        let reg = registry();
        let ctx = EvalContext::new(reg.clone());
        let result = reg.call_function("doubel", &[], &ctx);
        let err = result.as_error().unwrap();
        assert!(err.is(codes::UNDEFINED_FUNC));
        assert!(err.suggestion.as_deref().unwrap_or("").contains("double"));
    }

    #[test]
    fn test_help_and_list() {
        let reg = registry();
        let help = reg.help(Some("double"));
        assert_eq!(help.get("usage").as_text(), Some("double(x)"));

        let listed = reg.list_functions(Some("test"));
        assert_eq!(listed.as_list().map(|l| l.len()), Some(1));
        let none = reg.list_functions(Some("matrix"));
        assert_eq!(none.as_list().map(|l| l.len()), Some(0));
    }

    #[test]
    fn test_arity_checked_before_dispatch() {
        let reg = registry();
        let ctx = EvalContext::new(reg.clone());
        let result = reg.call_function("double", &[Value::from(1i64), Value::from(2i64)], &ctx);
        assert!(result.as_error().is_some_and(|e| e.is(codes::ARG_COUNT)));
    }
}
