//! Namespace builder

use config::InputSpec;
use fetchers::Fetcher;
use std::collections::{HashMap, HashSet};
use types::{Namespace, ResolveError, Result, WELL_KNOWN_KEYS};

/// Fetches every declared input and binds it into the namespace
pub struct NamespaceBuilder<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
}

impl<'a, F: Fetcher + ?Sized> NamespaceBuilder<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Resolve `inputs` into `namespace`.
    ///
    /// Names are checked against the well-known keys, the namespace and each
    /// other before anything is fetched. Inputs are then fetched one at a time
    /// in declaration order, except that an input referenced by a file is
    /// fetched before that file.
    pub async fn build(&self, inputs: &[InputSpec], namespace: &mut Namespace) -> Result<()> {
        check_names(inputs, namespace)?;

        let order = self.plan(inputs)?;
        for spec in order {
            tracing::debug!(input = %spec.name, kind = %spec.kind(), "Resolving input");
            let value = self.fetcher.fetch(spec, namespace).await?;
            namespace.bind(spec.name.clone(), value)?;
        }

        tracing::info!(inputs = inputs.len(), "Resolved all inputs");
        Ok(())
    }

    /// Fetch order: declaration order with dependencies pulled ahead
    pub fn plan<'s>(&self, inputs: &'s [InputSpec]) -> Result<Vec<&'s InputSpec>> {
        let declared: HashMap<&str, &InputSpec> =
            inputs.iter().map(|spec| (spec.name.as_str(), spec)).collect();

        let mut planner = Planner {
            fetcher: self.fetcher,
            declared,
            done: HashSet::new(),
            stack: Vec::new(),
            order: Vec::with_capacity(inputs.len()),
        };
        for spec in inputs {
            planner.visit(spec)?;
        }
        Ok(planner.order)
    }
}

struct Planner<'s, 'f, F: Fetcher + ?Sized> {
    fetcher: &'f F,
    declared: HashMap<&'s str, &'s InputSpec>,
    done: HashSet<&'s str>,
    stack: Vec<&'s str>,
    order: Vec<&'s InputSpec>,
}

impl<'s, 'f, F: Fetcher + ?Sized> Planner<'s, 'f, F> {
    fn visit(&mut self, spec: &'s InputSpec) -> Result<()> {
        let name = spec.name.as_str();
        if self.done.contains(name) {
            return Ok(());
        }
        if let Some(pos) = self.stack.iter().position(|n| *n == name) {
            let mut chain: Vec<String> = self.stack[pos..].iter().map(|n| n.to_string()).collect();
            chain.push(name.to_string());
            return Err(ResolveError::CircularReference { chain });
        }

        self.stack.push(name);
        for dependency in self.fetcher.dependencies(spec)? {
            // names outside the declared inputs are seeded keys or fail at expansion
            if let Some(&target) = self.declared.get(dependency.as_str()) {
                self.visit(target)?;
            }
        }
        self.stack.pop();

        self.done.insert(name);
        self.order.push(spec);
        Ok(())
    }
}

fn check_names(inputs: &[InputSpec], namespace: &Namespace) -> Result<()> {
    let mut seen = HashSet::new();
    for spec in inputs {
        let reserved = WELL_KNOWN_KEYS.contains(&spec.name.as_str());
        if reserved || namespace.contains(&spec.name) || !seen.insert(spec.name.as_str()) {
            tracing::error!(input = %spec.name, "Input name already exists");
            return Err(ResolveError::DuplicateName { name: spec.name.clone() });
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use config::SourceSpec;
    use std::sync::Mutex;
    use types::{environment, FetchError, Value, ARG_KEY, CFG_KEY, ENV_KEY, FILE_KEY};

    /// Fetcher returning canned values and recording fetch order
    #[derive(Default)]
    pub(crate) struct StubFetcher {
        values: HashMap<String, Value>,
        dependencies: HashMap<String, Vec<String>>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub(crate) fn with_value(mut self, name: &str, value: Value) -> Self {
            self.values.insert(name.to_string(), value);
            self
        }

        pub(crate) fn with_dependencies(mut self, name: &str, deps: &[&str]) -> Self {
            self.dependencies
                .insert(name.to_string(), deps.iter().map(|d| d.to_string()).collect());
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, spec: &InputSpec, _namespace: &Namespace) -> Result<Value> {
            self.calls.lock().unwrap().push(spec.name.clone());
            self.values.get(&spec.name).cloned().ok_or_else(|| {
                FetchError::Transport { input: spec.name.clone(), message: "unreachable".into() }.into()
            })
        }

        fn dependencies(&self, spec: &InputSpec) -> Result<Vec<String>> {
            Ok(self.dependencies.get(&spec.name).cloned().unwrap_or_default())
        }
    }

    pub(crate) fn file_input(name: &str) -> InputSpec {
        InputSpec {
            name: name.to_string(),
            source: SourceSpec::File { path: format!("{}.yaml", name).into() },
        }
    }

    #[tokio::test]
    async fn test_binds_inputs_in_declaration_order() {
        let fetcher = StubFetcher::default()
            .with_value("zeta", [("z", 1i64)].into_iter().collect())
            .with_value("alpha", [("a", 2i64)].into_iter().collect());
        let inputs = vec![file_input("zeta"), file_input("alpha")];

        let mut namespace = Namespace::new();
        NamespaceBuilder::new(&fetcher).build(&inputs, &mut namespace).await.unwrap();

        assert_eq!(fetcher.calls(), ["zeta", "alpha"]);
        assert_eq!(namespace.names().collect::<Vec<_>>(), ["zeta", "alpha"]);
        assert_eq!(namespace.get("alpha").and_then(|v| v.get("a")), Some(&Value::Integer(2)));
    }

    #[tokio::test]
    async fn test_well_known_names_are_rejected() {
        for reserved in [ENV_KEY, ARG_KEY, CFG_KEY] {
            let fetcher = StubFetcher::default().with_value(reserved, Value::mapping());
            let mut namespace = Namespace::new();
            namespace.bind(ENV_KEY, environment([("HOME", "/root")])).unwrap();
            namespace.bind(ARG_KEY, Value::mapping()).unwrap();
            namespace.bind(CFG_KEY, Value::mapping()).unwrap();

            let err = NamespaceBuilder::new(&fetcher)
                .build(&[file_input(reserved)], &mut namespace)
                .await
                .unwrap_err();

            assert!(matches!(err, ResolveError::DuplicateName { ref name } if name == reserved));
            assert!(fetcher.calls().is_empty(), "nothing is fetched after a name clash");
        }
    }

    #[tokio::test]
    async fn test_well_known_names_are_rejected_when_unseeded() {
        for reserved in [ARG_KEY, FILE_KEY, CFG_KEY] {
            let fetcher = StubFetcher::default().with_value(reserved, [("tier", "web")].into_iter().collect());
            let mut namespace = Namespace::new();
            namespace.bind(ENV_KEY, environment([("HOME", "/root")])).unwrap();

            let err = NamespaceBuilder::new(&fetcher)
                .build(&[file_input(reserved)], &mut namespace)
                .await
                .unwrap_err();

            assert!(matches!(err, ResolveError::DuplicateName { ref name } if name == reserved));
            assert!(!namespace.contains(reserved));
            assert!(fetcher.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_repeated_input_name_is_rejected() {
        let fetcher = StubFetcher::default().with_value("site", Value::mapping());
        let mut namespace = Namespace::new();

        let err = NamespaceBuilder::new(&fetcher)
            .build(&[file_input("site"), file_input("site")], &mut namespace)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::DuplicateName { .. }));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dependencies_are_fetched_first() {
        let fetcher = StubFetcher::default()
            .with_value("site", Value::mapping())
            .with_value("region", Value::mapping())
            .with_value("base", Value::mapping())
            .with_dependencies("site", &["Env", "region"])
            .with_dependencies("region", &["base"]);
        let inputs = vec![file_input("site"), file_input("base"), file_input("region")];

        let mut namespace = Namespace::new();
        NamespaceBuilder::new(&fetcher).build(&inputs, &mut namespace).await.unwrap();

        assert_eq!(fetcher.calls(), ["base", "region", "site"]);
    }

    #[test]
    fn test_cycle_is_reported_with_chain() {
        let fetcher = StubFetcher::default()
            .with_dependencies("a", &["b"])
            .with_dependencies("b", &["c"])
            .with_dependencies("c", &["a"]);
        let inputs = vec![file_input("a"), file_input("b"), file_input("c")];

        let err = NamespaceBuilder::new(&fetcher).plan(&inputs).unwrap_err();
        match err {
            ResolveError::CircularReference { chain } => assert_eq!(chain, ["a", "b", "c", "a"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let fetcher = StubFetcher::default().with_dependencies("a", &["a"]);
        let err = NamespaceBuilder::new(&fetcher).plan(&[file_input("a")]).unwrap_err();
        assert!(matches!(err, ResolveError::CircularReference { ref chain } if chain.len() == 2));
    }

    #[tokio::test]
    async fn test_first_fetch_error_aborts() {
        let fetcher = StubFetcher::default().with_value("b", Value::mapping());
        let inputs = vec![file_input("a"), file_input("b")];

        let mut namespace = Namespace::new();
        let err = NamespaceBuilder::new(&fetcher).build(&inputs, &mut namespace).await.unwrap_err();

        assert!(matches!(err, ResolveError::Fetch(FetchError::Transport { .. })));
        assert_eq!(fetcher.calls(), ["a"]);
        assert!(namespace.is_empty());
    }
}
