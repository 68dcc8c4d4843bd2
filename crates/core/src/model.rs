//! Survey model: variables, states, transitions, blocks, and the owning
//! [`Survey`].
//!
//! A `Survey` is immutable once built. Fields are private and exposed
//! through read-only accessors; any transformation returns a new value.
//! Construction goes through [`SurveyBuilder`], which records what it is
//! given without checking it. Structural validity (unique ids, resolvable
//! transition endpoints) is checked by the analyzer.

use crate::ast::Expression;
use std::collections::{BTreeMap, HashMap};

/// Sentinel transition endpoint marking the start of the interview.
pub const START: &str = "START";
/// Sentinel transition endpoint marking the end of the interview.
pub const END: &str = "END";

/// True for `START` and `END`.
pub fn is_sentinel(id: &str) -> bool {
    id == START || id == END
}

// ──────────────────────────────────────────────
// Entities
// ──────────────────────────────────────────────

/// A declared survey variable (data slot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub description: Option<String>,
    /// Documentation-only type label, e.g. "integer".
    pub data_type: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Variable {
            name: name.into(),
            description: None,
            data_type: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }
}

/// Inclusive wave/version interval in which a state applies.
///
/// Deployment metadata only; routing never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange {
    pub apply_from: i64,
    pub apply_to: Option<i64>,
}

impl VersionRange {
    pub fn starting(apply_from: i64) -> Self {
        VersionRange {
            apply_from,
            apply_to: None,
        }
    }

    pub fn between(apply_from: i64, apply_to: i64) -> Self {
        VersionRange {
            apply_from,
            apply_to: Some(apply_to),
        }
    }

    pub fn contains(&self, wave: i64) -> bool {
        wave >= self.apply_from && self.apply_to.map_or(true, |to| wave <= to)
    }
}

/// A survey state, typically one question.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub id: String,
    pub text: String,
    /// May this state be entered at all.
    pub entry_guard: Option<Expression>,
    /// Is a response to this state legal.
    pub validation: Option<Expression>,
    pub version: Option<VersionRange>,
    /// Name of the block this state instantiates, if any.
    pub block: Option<String>,
}

impl State {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        State {
            id: id.into(),
            text: text.into(),
            entry_guard: None,
            validation: None,
            version: None,
            block: None,
        }
    }

    pub fn with_entry_guard(mut self, guard: Expression) -> Self {
        self.entry_guard = Some(guard);
        self
    }

    pub fn with_validation(mut self, validation: Expression) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_version(mut self, version: VersionRange) -> Self {
        self.version = Some(version);
        self
    }

    pub fn in_block(mut self, block: impl Into<String>) -> Self {
        self.block = Some(block.into());
        self
    }
}

/// A directed edge between two states (or a sentinel and a state).
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from_state: String,
    pub to_state: String,
    /// `None` means unconditional.
    pub guard: Option<Expression>,
}

impl Transition {
    pub fn new(from_state: impl Into<String>, to_state: impl Into<String>) -> Self {
        Transition {
            from_state: from_state.into(),
            to_state: to_state.into(),
            guard: None,
        }
    }

    pub fn guarded(
        from_state: impl Into<String>,
        to_state: impl Into<String>,
        guard: Expression,
    ) -> Self {
        Transition {
            from_state: from_state.into(),
            to_state: to_state.into(),
            guard: Some(guard),
        }
    }

    pub fn is_unconditional(&self) -> bool {
        self.guard.is_none()
    }
}

/// An abstract, parameterized pattern of state templates.
///
/// Instantiated states live in the survey as ordinary states named by
/// convention: template `"BType"` with suffix `"2"` becomes `"BType2"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub name: String,
    pub parameters: Vec<String>,
    pub state_templates: Vec<String>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Block {
            name: name.into(),
            parameters: Vec::new(),
            state_templates: Vec::new(),
        }
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_state_templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state_templates = templates.into_iter().map(Into::into).collect();
        self
    }

    /// State ids of one instantiation, in template order.
    pub fn instance_ids(&self, suffix: &str) -> Vec<String> {
        self.state_templates
            .iter()
            .map(|template| format!("{}{}", template, suffix))
            .collect()
    }
}

// ──────────────────────────────────────────────
// Survey
// ──────────────────────────────────────────────

/// Root container owning every entity of one survey definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Survey {
    name: String,
    variables: Vec<Variable>,
    states: Vec<State>,
    transitions: Vec<Transition>,
    blocks: Vec<Block>,
    metadata: BTreeMap<String, String>,
}

impl Survey {
    pub fn builder(name: impl Into<String>) -> SurveyBuilder {
        SurveyBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// Transitions leaving `state_id`, in declaration order.
    pub fn outgoing<'a>(&'a self, state_id: &'a str) -> impl Iterator<Item = &'a Transition> + 'a {
        self.transitions
            .iter()
            .filter(move |t| t.from_state == state_id)
    }

    /// Build a name/id lookup index borrowing from this survey.
    pub fn index(&self) -> SurveyIndex<'_> {
        SurveyIndex::new(self)
    }

    /// A new survey restricted to what applies at `wave`.
    ///
    /// Keeps unversioned states and states whose range contains `wave`;
    /// keeps transitions whose endpoints are kept states or sentinels.
    /// Variables, blocks and metadata are carried over unchanged.
    pub fn filter_by_version(&self, wave: i64) -> Survey {
        let states: Vec<State> = self
            .states
            .iter()
            .filter(|s| s.version.map_or(true, |v| v.contains(wave)))
            .cloned()
            .collect();

        let kept = |id: &str| is_sentinel(id) || states.iter().any(|s| s.id == id);
        let transitions = self
            .transitions
            .iter()
            .filter(|t| kept(&t.from_state) && kept(&t.to_state))
            .cloned()
            .collect();

        Survey {
            name: self.name.clone(),
            variables: self.variables.clone(),
            states,
            transitions,
            blocks: self.blocks.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Reopen this survey as a builder seeded with a copy of its contents.
    pub fn to_builder(&self) -> SurveyBuilder {
        SurveyBuilder {
            survey: self.clone(),
        }
    }
}

/// Incremental, unchecked construction of a [`Survey`].
#[derive(Debug, Clone)]
pub struct SurveyBuilder {
    survey: Survey,
}

impl SurveyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        SurveyBuilder {
            survey: Survey {
                name: name.into(),
                variables: Vec::new(),
                states: Vec::new(),
                transitions: Vec::new(),
                blocks: Vec::new(),
                metadata: BTreeMap::new(),
            },
        }
    }

    pub fn variable(mut self, variable: Variable) -> Self {
        self.survey.variables.push(variable);
        self
    }

    pub fn state(mut self, state: State) -> Self {
        self.survey.states.push(state);
        self
    }

    pub fn transition(mut self, transition: Transition) -> Self {
        self.survey.transitions.push(transition);
        self
    }

    pub fn block(mut self, block: Block) -> Self {
        self.survey.blocks.push(block);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.survey.metadata.insert(key.into(), value.into());
        self
    }

    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.survey.variables.extend(variables);
        self
    }

    pub fn states(mut self, states: impl IntoIterator<Item = State>) -> Self {
        self.survey.states.extend(states);
        self
    }

    pub fn transitions(mut self, transitions: impl IntoIterator<Item = Transition>) -> Self {
        self.survey.transitions.extend(transitions);
        self
    }

    pub fn build(self) -> Survey {
        self.survey
    }
}

// ──────────────────────────────────────────────
// Index
// ──────────────────────────────────────────────

/// Non-owning lookup tables over a survey.
///
/// When ids repeat (a structurally invalid survey), the first occurrence wins.
#[derive(Debug)]
pub struct SurveyIndex<'a> {
    pub states: HashMap<&'a str, &'a State>,
    pub variables: HashMap<&'a str, &'a Variable>,
    pub blocks: HashMap<&'a str, &'a Block>,
}

impl<'a> SurveyIndex<'a> {
    fn new(survey: &'a Survey) -> Self {
        let mut states = HashMap::new();
        for s in &survey.states {
            states.entry(s.id.as_str()).or_insert(s);
        }
        let mut variables = HashMap::new();
        for v in &survey.variables {
            variables.entry(v.name.as_str()).or_insert(v);
        }
        let mut blocks = HashMap::new();
        for b in &survey.blocks {
            blocks.entry(b.name.as_str()).or_insert(b);
        }
        SurveyIndex {
            states,
            variables,
            blocks,
        }
    }

    /// True when `id` is a known state or a sentinel.
    pub fn resolves(&self, id: &str) -> bool {
        is_sentinel(id) || self.states.contains_key(id)
    }
}
