use crate::loader::ModuleSet;
use crate::options::AnalysisOptions;
use crate::passes::{
    const_eval::ConstantEvaluation, constraints::ConstraintValidation, desugar,
    layout::SizeCalculation, reachability::Reachability, resolve::NameResolution,
    symbols::SymbolCollection, typecheck::TypeChecking, AnalyzerPass,
};
use crate::session::AnalysisSession;
use log::debug;

/// Run the full analysis over a module set: the phase-0 desugaring rewrite
/// followed by the seven semantic phases in fixed order. Every phase runs
/// to completion regardless of errors from earlier phases; the caller
/// decides from `session.diagnostics` whether the run failed.
pub fn analyze(set: &mut ModuleSet, options: AnalysisOptions) -> AnalysisSession {
    desugar::desugar_module_set(set);

    let mut session = AnalysisSession::new(options);
    let passes: [&dyn AnalyzerPass; 7] = [
        &SymbolCollection,
        &NameResolution,
        &TypeChecking,
        &ConstantEvaluation,
        &SizeCalculation,
        &ConstraintValidation,
        &Reachability,
    ];

    for pass in passes {
        let window_start = session.diagnostics.len();
        pass.run(set, &mut session);
        // Ties within a phase break by source position; cross-phase order
        // is emission order. Golden-output tests rely on this.
        session.diagnostics.sort_tail_by_position(window_start);
        debug!(
            "pass '{}' done ({} diagnostics total)",
            pass.id(),
            session.diagnostics.len()
        );
    }

    let options = session.options.clone();
    session.diagnostics.apply_policy(&options);
    session
}
