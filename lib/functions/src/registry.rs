use crate::strings::{
    ContainsSparqlOp, LCaseSparqlOp, LangMatchesSparqlOp, RegexSparqlOp, StrEndsSparqlOp,
    StrLenSparqlOp, StrStartsSparqlOp, UCaseSparqlOp,
};
use crate::terms::{
    DatatypeSparqlOp, IsBlankSparqlOp, IsIriSparqlOp, IsLiteralSparqlOp, IsNumericSparqlOp,
    LangSparqlOp, StrSparqlOp,
};
use crate::ScalarSparqlOp;
use rdf_query_logical::Function;
use rustc_hash::FxHashMap;

/// Maps each built-in [Function] to its implementation.
#[derive(Debug)]
pub struct FunctionRegistry {
    functions: FxHashMap<Function, Box<dyn ScalarSparqlOp>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            functions: FxHashMap::default(),
        };
        registry.register(Function::Str, StrSparqlOp);
        registry.register(Function::Lang, LangSparqlOp);
        registry.register(Function::LangMatches, LangMatchesSparqlOp);
        registry.register(Function::Datatype, DatatypeSparqlOp);
        registry.register(Function::IsIri, IsIriSparqlOp);
        registry.register(Function::IsBlank, IsBlankSparqlOp);
        registry.register(Function::IsLiteral, IsLiteralSparqlOp);
        registry.register(Function::IsNumeric, IsNumericSparqlOp);
        registry.register(Function::StrLen, StrLenSparqlOp);
        registry.register(Function::UCase, UCaseSparqlOp);
        registry.register(Function::LCase, LCaseSparqlOp);
        registry.register(Function::Contains, ContainsSparqlOp);
        registry.register(Function::StrStarts, StrStartsSparqlOp);
        registry.register(Function::StrEnds, StrEndsSparqlOp);
        registry.register(Function::Regex, RegexSparqlOp::default());
        registry
    }

    /// Registers `op` for `function`, replacing a previous implementation.
    pub fn register(&mut self, function: Function, op: impl ScalarSparqlOp + 'static) {
        self.functions.insert(function, Box::new(op));
    }

    pub fn get(&self, function: Function) -> Option<&dyn ScalarSparqlOp> {
        self.functions.get(&function).map(AsRef::as_ref)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_every_function() {
        let registry = FunctionRegistry::new();
        for function in [
            Function::Str,
            Function::Lang,
            Function::LangMatches,
            Function::Datatype,
            Function::IsIri,
            Function::IsBlank,
            Function::IsLiteral,
            Function::IsNumeric,
            Function::StrLen,
            Function::UCase,
            Function::LCase,
            Function::Contains,
            Function::StrStarts,
            Function::StrEnds,
            Function::Regex,
        ] {
            let op = registry.get(function).unwrap();
            assert_eq!(op.name(), function.name());
        }
    }
}
