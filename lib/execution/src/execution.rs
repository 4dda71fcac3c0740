use crate::construct::ConstructMaterializer;
use crate::engine::{PlanEvaluator, SolutionIter};
use crate::results::{CloseSignal, QueryQuadIter, QuerySolutionIter, QueryTripleIter};
use crate::sparql::error::QueryEvaluationError;
use crate::sparql::{Optimizer, QueryOptions};
use rdf_query_functions::ExpressionEvaluator;
use rdf_query_logical::{substitute_query, ConstructTemplate, Query, QueryForm};
use rdf_query_model::{Binding, Dataset, Graph};
use std::rc::Rc;
use tracing::debug;

/// A single execution of a [Query] against a [Dataset].
///
/// An initial binding may be set before the query is executed. Its variables are substituted into
/// the query before the optimizer runs, and they are part of every solution, even if the pattern
/// does not mention them.
///
/// Closing or dropping the execution closes every result iterator it has returned.
///
/// ```
/// # use rdf_query_execution::QueryExecution;
/// # use rdf_query_logical::Query;
/// # use rdf_query_model::{Binding, Dataset, NamedNode, Variable};
/// let query = Query::parse("ASK { FILTER(?a = <http://constant>) }", None)?;
/// let dataset = Dataset::new();
///
/// let mut execution = QueryExecution::new(&query, &dataset);
/// execution.set_initial_binding(Binding::from_iter([(
///     Variable::new("a")?,
///     NamedNode::new("http://constant")?.into(),
/// )]))?;
/// assert!(execution.exec_ask()?);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug)]
pub struct QueryExecution<'a> {
    query: Query,
    dataset: &'a Dataset,
    options: QueryOptions,
    initial_binding: Binding,
    expressions: Rc<ExpressionEvaluator>,
    started: bool,
    signal: CloseSignal,
}

impl<'a> QueryExecution<'a> {
    pub fn new(query: &Query, dataset: &'a Dataset) -> Self {
        Self::with_options(query, dataset, QueryOptions::default())
    }

    pub fn with_options(query: &Query, dataset: &'a Dataset, options: QueryOptions) -> Self {
        Self {
            query: query.clone(),
            dataset,
            options,
            initial_binding: Binding::new(),
            expressions: Rc::default(),
            started: false,
            signal: CloseSignal::default(),
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn initial_binding(&self) -> &Binding {
        &self.initial_binding
    }

    /// Sets the initial binding. Fails once the query has been executed.
    pub fn set_initial_binding(&mut self, binding: Binding) -> Result<(), QueryEvaluationError> {
        if self.is_closed() {
            return Err(QueryEvaluationError::Closed);
        }
        if self.started {
            return Err(QueryEvaluationError::AlreadyStarted);
        }
        self.initial_binding = binding;
        Ok(())
    }

    pub fn exec_select(&mut self) -> Result<QuerySolutionIter<'a>, QueryEvaluationError> {
        self.check_form(QueryForm::Select)?;
        let Query::Select { variables, .. } = &self.query else {
            return QueryEvaluationError::internal("SELECT query without variables".to_owned());
        };
        let variables = variables.clone();
        let solutions = self.evaluate()?;
        Ok(QuerySolutionIter::new(
            variables,
            solutions,
            self.signal.clone(),
        ))
    }

    /// Returns whether the query has a solution. Evaluation stops at the first solution.
    pub fn exec_ask(&mut self) -> Result<bool, QueryEvaluationError> {
        self.check_form(QueryForm::Ask)?;
        Ok(self.evaluate()?.next().is_some())
    }

    /// Constructs the triples of the default graph templates. Templates nested in `GRAPH` blocks
    /// are ignored.
    pub fn exec_construct_triples(&mut self) -> Result<QueryTripleIter<'a>, QueryEvaluationError> {
        let template = self.construct_template()?;
        let solutions = self.evaluate()?;
        let materializer = ConstructMaterializer::triples(
            &template,
            solutions,
            self.options.unbound_template_variables,
        );
        Ok(QueryTripleIter::new(materializer, self.signal.clone()))
    }

    /// Constructs the quads of all templates. Templates outside of `GRAPH` blocks produce quads in
    /// the default graph.
    pub fn exec_construct_quads(&mut self) -> Result<QueryQuadIter<'a>, QueryEvaluationError> {
        let template = self.construct_template()?;
        let solutions = self.evaluate()?;
        let materializer = ConstructMaterializer::quads(
            &template,
            solutions,
            self.options.unbound_template_variables,
        );
        Ok(QueryQuadIter::new(materializer, self.signal.clone()))
    }

    /// Collects the result of [Self::exec_construct_triples] into a [Graph].
    pub fn exec_construct(&mut self) -> Result<Graph, QueryEvaluationError> {
        self.exec_construct_triples()?.collect_as_graph()
    }

    /// Closes the execution and every result iterator it has returned. Closing twice has no
    /// further effect.
    pub fn close(&mut self) {
        self.signal.close();
    }

    pub fn is_closed(&self) -> bool {
        self.signal.is_closed()
    }

    fn check_form(&self, expected: QueryForm) -> Result<(), QueryEvaluationError> {
        if self.is_closed() {
            return Err(QueryEvaluationError::Closed);
        }
        let actual = self.query.form();
        if actual != expected {
            return Err(QueryEvaluationError::UnexpectedQueryForm { expected, actual });
        }
        Ok(())
    }

    /// Returns the template after checking that every template variable can be bound.
    fn construct_template(&self) -> Result<ConstructTemplate, QueryEvaluationError> {
        self.check_form(QueryForm::Construct)?;
        let Query::Construct { template, pattern } = &self.query else {
            return QueryEvaluationError::internal("CONSTRUCT query without template".to_owned());
        };

        let in_scope = pattern.in_scope_variables();
        let unbound = template
            .variables()
            .into_iter()
            .find(|variable| {
                !in_scope.contains(*variable) && !self.initial_binding.contains(variable)
            });
        match unbound {
            Some(variable) => Err(QueryEvaluationError::UnboundTemplateVariable(
                variable.clone(),
            )),
            None => Ok(template.clone()),
        }
    }

    /// Substitutes the initial binding, optimizes the plan and starts its evaluation.
    fn evaluate(&mut self) -> Result<SolutionIter<'a>, QueryEvaluationError> {
        self.started = true;

        let plan = substitute_query(&self.query, &self.initial_binding)?
            .pattern()
            .clone();
        debug!(%plan, "Substituted initial binding");
        let optimizer = Optimizer::with_level(
            self.options.optimization_level,
            Rc::clone(&self.expressions),
        );
        let plan = optimizer.optimize(plan);
        debug!(%plan, "Optimized query plan");

        // The substituted variables are gone from the plan. Adding them back to every solution
        // also drops solutions that bind them differently, e.g., through BIND.
        let initial_binding = self.initial_binding.clone();
        let evaluator = PlanEvaluator::new(self.dataset, Rc::clone(&self.expressions));
        let solutions = evaluator
            .evaluate(&plan, Binding::new())
            .filter_map(move |solution| solution.merge(&initial_binding));
        Ok(Box::new(solutions))
    }
}

impl Drop for QueryExecution<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
