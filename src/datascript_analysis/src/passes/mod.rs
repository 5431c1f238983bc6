use crate::loader::ModuleSet;
use crate::session::AnalysisSession;

pub mod const_eval;
pub mod constraints;
pub mod desugar;
pub mod layout;
pub mod reachability;
pub mod resolve;
pub mod symbols;
pub mod typecheck;

/// One semantic phase. Phases run in fixed order over the whole module set
/// and never abort early; every phase appends diagnostics and artifacts to
/// the session.
pub trait AnalyzerPass {
    fn id(&self) -> &'static str;
    fn run(&self, set: &ModuleSet, session: &mut AnalysisSession);
}
