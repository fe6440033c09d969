//! Convergence engine: runs latex (and bibtex once, if needed) until
//! cross-references, citations and the table of contents settle.
//!
//! The flow is forward-only:
//!
//! ```text
//! first pass -> [bibtex] -> [re-run for aux/toc] -> [re-run for citations] -> converged
//! ```
//!
//! Whether to re-run is delegated to a [`RerunPolicy`]. [`BoundedPolicy`]
//! allows at most one re-run per condition (three latex passes in total);
//! [`FixedPointPolicy`] keeps going until the warnings stop changing, capped
//! by an explicit pass ceiling.

use tracing::{debug, info, warn};

use crate::config::ToolNames;
use crate::diagnostics::{Diagnostics, ToolKind};
use crate::error::BuildError;
use crate::request::BuildRequest;
use crate::tool::{InvocationResult, ToolInvoker, ToolSpec};

/// Why another text-compiler pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerunReason {
    MissingAuxOrToc,
    UndefinedCitations,
    DiagnosticsChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Rerun(RerunReason),
    Converge,
}

/// Progress of one build. Created fresh per build and only changed through
/// the engine's transitions; `converged` is never reset once set.
#[derive(Debug, Clone, Default)]
pub struct ConvergenceState {
    pass: u32,
    latest: Diagnostics,
    previous: Option<Diagnostics>,
    bibliography_ran: bool,
    reruns: Vec<RerunReason>,
    converged: bool,
}

impl ConvergenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of text-compiler passes so far.
    pub fn pass(&self) -> u32 {
        self.pass
    }

    /// Diagnostics of the most recent text-compiler pass.
    pub fn latest(&self) -> &Diagnostics {
        &self.latest
    }

    /// Diagnostics of the pass before the most recent one.
    pub fn previous(&self) -> Option<&Diagnostics> {
        self.previous.as_ref()
    }

    pub fn bibliography_ran(&self) -> bool {
        self.bibliography_ran
    }

    pub fn reruns(&self) -> &[RerunReason] {
        &self.reruns
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    fn record_text_pass(&mut self, diagnostics: Diagnostics) {
        if self.converged {
            warn!("[ENGINE] Ignoring text pass recorded after convergence");
            return;
        }
        let prev = std::mem::replace(&mut self.latest, diagnostics);
        self.previous = (self.pass > 0).then_some(prev);
        self.pass += 1;
    }

    fn record_bibliography(&mut self) {
        self.bibliography_ran = true;
    }

    fn record_rerun(&mut self, reason: RerunReason) {
        self.reruns.push(reason);
    }

    fn mark_converged(&mut self) {
        self.converged = true;
    }
}

/// Decides, after each text-compiler pass, whether another one is needed.
/// Implementations must terminate for every possible sequence of outputs.
pub trait RerunPolicy: Send + Sync {
    fn decide(&self, state: &ConvergenceState) -> Decision;
}

/// One re-run if the first pass lacked aux/toc data, then one more if
/// citations are still undefined. Never more than three passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundedPolicy;

impl RerunPolicy for BoundedPolicy {
    fn decide(&self, state: &ConvergenceState) -> Decision {
        let reruns = state.reruns();
        if reruns.contains(&RerunReason::UndefinedCitations) {
            return Decision::Converge;
        }
        let conditions = state.latest().conditions;
        if reruns.is_empty() && conditions.missing_aux_or_toc {
            return Decision::Rerun(RerunReason::MissingAuxOrToc);
        }
        if conditions.undefined_citations {
            return Decision::Rerun(RerunReason::UndefinedCitations);
        }
        Decision::Converge
    }
}

/// Re-run until two consecutive passes report the same warnings and error
/// blocks, or `max_passes` is reached.
#[derive(Debug, Clone, Copy)]
pub struct FixedPointPolicy {
    pub max_passes: u32,
}

impl Default for FixedPointPolicy {
    fn default() -> Self {
        Self { max_passes: 5 }
    }
}

impl RerunPolicy for FixedPointPolicy {
    fn decide(&self, state: &ConvergenceState) -> Decision {
        if state.pass() >= self.max_passes {
            return Decision::Converge;
        }
        let latest = state.latest();
        match state.previous() {
            None if latest.conditions.missing_aux_or_toc => {
                Decision::Rerun(RerunReason::MissingAuxOrToc)
            }
            None if latest.conditions.undefined_citations => {
                Decision::Rerun(RerunReason::UndefinedCitations)
            }
            None => Decision::Converge,
            Some(prev) if prev.warnings == latest.warnings && prev.errors == latest.errors => {
                Decision::Converge
            }
            Some(_) => Decision::Rerun(RerunReason::DiagnosticsChanged),
        }
    }
}

/// Result of a converged text stage.
#[derive(Debug, Clone)]
pub struct ConvergenceOutcome {
    pub state: ConvergenceState,
    /// The final text-compiler pass.
    pub text: InvocationResult,
    /// Present only if bibtex ran.
    pub bibliography: Option<InvocationResult>,
}

impl ConvergenceOutcome {
    pub fn passes(&self) -> u32 {
        self.state.pass()
    }

    pub fn bibliography_passes(&self) -> u32 {
        u32::from(self.bibliography.is_some())
    }

    pub fn success(&self) -> bool {
        self.text.success
    }
}

pub struct ConvergenceEngine<'a> {
    invoker: &'a ToolInvoker<'a>,
    tools: &'a ToolNames,
    policy: &'a dyn RerunPolicy,
}

impl<'a> ConvergenceEngine<'a> {
    pub fn new(
        invoker: &'a ToolInvoker<'a>,
        tools: &'a ToolNames,
        policy: &'a dyn RerunPolicy,
    ) -> Self {
        Self {
            invoker,
            tools,
            policy,
        }
    }

    /// Run the text compiler until the policy settles.
    ///
    /// bibtex only runs when the first pass reports a missing `.bbl` and no
    /// missing aux/toc. The staging dir starts empty on every full build, so
    /// a real first pass always lacks the aux file and bibtex is skipped
    /// there; it only fires when the staging dir already holds an aux file.
    pub async fn converge(&self, request: &BuildRequest) -> Result<ConvergenceOutcome, BuildError> {
        let latex =
            ToolSpec::new(ToolKind::TextCompiler, &self.tools.latex, request.latex_file()).silent(true);
        let mut state = ConvergenceState::new();

        info!(base = %request.base, "[ENGINE] First text pass");
        let mut text = self.invoker.invoke(&latex).await?;
        state.record_text_pass(text.diagnostics());

        let mut bibliography = None;
        let conditions = state.latest().conditions;
        if request.bibliography.is_some()
            && !state.bibliography_ran()
            && !conditions.missing_aux_or_toc
            && conditions.missing_bibliography_output
        {
            info!(base = %request.base, "[ENGINE] Bibliography output missing, running bibtex");
            let bibtex = ToolSpec::new(
                ToolKind::BibliographyCompiler,
                &self.tools.bibtex,
                request.bibtex_input(),
            )
            .silent(true);
            bibliography = Some(self.invoker.invoke(&bibtex).await?);
            state.record_bibliography();
        }

        while let Decision::Rerun(reason) = self.policy.decide(&state) {
            info!(pass = state.pass() + 1, ?reason, "[ENGINE] Re-running text compiler");
            state.record_rerun(reason);
            text = self.invoker.invoke(&latex).await?;
            state.record_text_pass(text.diagnostics());
        }

        state.mark_converged();
        info!(
            passes = state.pass(),
            bibliography = state.bibliography_ran(),
            "[ENGINE] Converged"
        );
        debug!(?state, "[ENGINE] Final state");

        let reporter = self.invoker.reporter();
        text.relay(reporter);
        if let Some(bib) = &bibliography {
            bib.relay(reporter);
        }

        Ok(ConvergenceOutcome {
            state,
            text,
            bibliography,
        })
    }
}
