//! GraphQL Documents
//!
//! Thin adapter over `graphql-parser`'s executable-document AST. A [`Document`]
//! keeps the source text it was parsed from (when there is one) so the resolver
//! can tell authored documents apart from hand-built ASTs.

use crate::error::DocumentError;
use graphql_parser::query::{
    self, Definition, FragmentDefinition, FragmentSpread, OperationDefinition, Selection,
    SelectionSet, TypeCondition,
};
use graphql_parser::Pos;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Owned executable-document AST.
pub type Ast = query::Document<'static, String>;

/// A parsed GraphQL executable document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    ast: Ast,
    source: Option<String>,
}

impl Document {
    /// Parse GraphQL source text, keeping the text alongside the AST.
    pub fn parse(source: &str) -> Result<Self, DocumentError> {
        let ast = query::parse_query::<String>(source)
            .map_err(|e| DocumentError::Parse(e.to_string()))?
            .into_static();
        Ok(Self {
            ast,
            source: Some(source.to_string()),
        })
    }

    /// Wrap an AST that has no source text.
    pub fn from_ast(ast: Ast) -> Self {
        Self { ast, source: None }
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn definitions(&self) -> &[Definition<'static, String>] {
        &self.ast.definitions
    }

    /// Source text, if the document was parsed or merged.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Root type of the first fragment definition.
    pub fn type_name(&self) -> Option<&str> {
        self.first_fragment().map(|fragment| match &fragment.type_condition {
            TypeCondition::On(name) => name.as_str(),
        })
    }

    /// Declared name of the first fragment definition.
    pub fn definition_name(&self) -> Option<&str> {
        self.first_fragment().map(|fragment| fragment.name.as_str())
    }

    /// Look up a fragment definition by name.
    pub fn fragment(&self, name: &str) -> Option<&FragmentDefinition<'static, String>> {
        self.fragments().find(|fragment| fragment.name == name)
    }

    /// Names of all fragment definitions, in document order.
    pub fn fragment_names(&self) -> Vec<&str> {
        self.fragments().map(|fragment| fragment.name.as_str()).collect()
    }

    /// Distinct fragment-spread names in first-occurrence order.
    ///
    /// Walks every operation and fragment definition, including spreads nested
    /// inside fields and inline fragments. Matching is exact and case-sensitive.
    pub fn fragment_spreads(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut spreads = Vec::new();
        for definition in &self.ast.definitions {
            collect_spreads(definition_selection_set(definition), &mut seen, &mut spreads);
        }
        spreads
    }

    /// Copy of this document with every spread of `name` removed.
    ///
    /// The copy keeps the source text of the original; pass it through
    /// [`Document::merge`] to get source text that reflects the pruning.
    pub fn without_spreads(&self, name: &str) -> Self {
        let mut ast = self.ast.clone();
        for definition in &mut ast.definitions {
            prune_spreads(definition_selection_set_mut(definition), name);
        }
        Self {
            ast,
            source: self.source.clone(),
        }
    }

    /// Build `fragment <name> on <type_name> { ...s1 ...s2 }`.
    pub fn spread_fragment(name: &str, type_name: &str, spreads: &[String]) -> Self {
        let items = spreads.iter().map(|spread| spread_selection(spread)).collect();
        Self::fragment_with_selections(name, type_name, items)
    }

    /// Build a fragment definition from ready-made selections.
    pub(crate) fn fragment_with_selections(
        name: &str,
        type_name: &str,
        items: Vec<Selection<'static, String>>,
    ) -> Self {
        let fragment = FragmentDefinition {
            position: Pos::default(),
            name: name.to_string(),
            type_condition: TypeCondition::On(type_name.to_string()),
            directives: Vec::new(),
            selection_set: SelectionSet {
                span: (Pos::default(), Pos::default()),
                items,
            },
        };
        Self::from_definitions(vec![Definition::Fragment(fragment)])
    }

    /// Combine documents into one.
    ///
    /// The result holds the union of all definitions. A fragment (or named
    /// operation) whose name was already seen is collapsed into the first
    /// occurrence, so merging is idempotent. The merged document carries
    /// freshly rendered source text.
    pub fn merge<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut fragment_names = HashSet::new();
        let mut operation_names = HashSet::new();
        let mut anonymous = HashSet::new();
        let mut definitions = Vec::new();

        for part in parts {
            for definition in &part.ast.definitions {
                let first = match definition {
                    Definition::Fragment(fragment) => fragment_names.insert(fragment.name.clone()),
                    Definition::Operation(operation) => match operation_name(operation) {
                        Some(name) => operation_names.insert(name.to_string()),
                        None => anonymous.insert(render(std::slice::from_ref(definition))),
                    },
                };
                if first {
                    definitions.push(definition.clone());
                } else {
                    debug!(
                        definition = %definition_label(definition),
                        "Collapsed duplicate definition during merge"
                    );
                }
            }
        }

        Self::from_definitions(definitions)
    }

    fn from_definitions(definitions: Vec<Definition<'static, String>>) -> Self {
        let source = render(&definitions);
        Self {
            ast: query::Document { definitions },
            source: Some(source),
        }
    }

    fn fragments(&self) -> impl Iterator<Item = &FragmentDefinition<'static, String>> {
        self.ast.definitions.iter().filter_map(|definition| match definition {
            Definition::Fragment(fragment) => Some(fragment),
            Definition::Operation(_) => None,
        })
    }

    fn first_fragment(&self) -> Option<&FragmentDefinition<'static, String>> {
        self.fragments().next()
    }
}

impl FromStr for Document {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Document::parse(s)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => f.write_str(source),
            None => write!(f, "{}", self.ast),
        }
    }
}

/// A bare `...name` selection.
pub(crate) fn spread_selection(name: &str) -> Selection<'static, String> {
    Selection::FragmentSpread(FragmentSpread {
        position: Pos::default(),
        fragment_name: name.to_string(),
        directives: Vec::new(),
    })
}

fn render(definitions: &[Definition<'static, String>]) -> String {
    query::Document {
        definitions: definitions.to_vec(),
    }
    .to_string()
}

fn operation_name<'a>(operation: &'a OperationDefinition<'static, String>) -> Option<&'a str> {
    match operation {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
    }
}

fn definition_label(definition: &Definition<'static, String>) -> String {
    match definition {
        Definition::Fragment(fragment) => format!("fragment {}", fragment.name),
        Definition::Operation(operation) => match operation_name(operation) {
            Some(name) => format!("operation {}", name),
            None => "anonymous operation".to_string(),
        },
    }
}

fn definition_selection_set<'d>(
    definition: &'d Definition<'static, String>,
) -> &'d SelectionSet<'static, String> {
    match definition {
        Definition::Fragment(fragment) => &fragment.selection_set,
        Definition::Operation(OperationDefinition::SelectionSet(set)) => set,
        Definition::Operation(OperationDefinition::Query(q)) => &q.selection_set,
        Definition::Operation(OperationDefinition::Mutation(m)) => &m.selection_set,
        Definition::Operation(OperationDefinition::Subscription(s)) => &s.selection_set,
    }
}

fn definition_selection_set_mut<'d>(
    definition: &'d mut Definition<'static, String>,
) -> &'d mut SelectionSet<'static, String> {
    match definition {
        Definition::Fragment(fragment) => &mut fragment.selection_set,
        Definition::Operation(OperationDefinition::SelectionSet(set)) => set,
        Definition::Operation(OperationDefinition::Query(q)) => &mut q.selection_set,
        Definition::Operation(OperationDefinition::Mutation(m)) => &mut m.selection_set,
        Definition::Operation(OperationDefinition::Subscription(s)) => &mut s.selection_set,
    }
}

fn collect_spreads(
    set: &SelectionSet<'static, String>,
    seen: &mut HashSet<String>,
    spreads: &mut Vec<String>,
) {
    for item in &set.items {
        match item {
            Selection::FragmentSpread(spread) => {
                if seen.insert(spread.fragment_name.clone()) {
                    spreads.push(spread.fragment_name.clone());
                }
            }
            Selection::Field(field) => collect_spreads(&field.selection_set, seen, spreads),
            Selection::InlineFragment(inline) => {
                collect_spreads(&inline.selection_set, seen, spreads)
            }
        }
    }
}

fn prune_spreads(set: &mut SelectionSet<'static, String>, name: &str) {
    set.items.retain(|item| {
        !matches!(item, Selection::FragmentSpread(spread) if spread.fragment_name == name)
    });
    for item in &mut set.items {
        match item {
            Selection::Field(field) => prune_spreads(&mut field.selection_set, name),
            Selection::InlineFragment(inline) => prune_spreads(&mut inline.selection_set, name),
            Selection::FragmentSpread(_) => {}
        }
    }
}
