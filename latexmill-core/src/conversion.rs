use tracing::info;

use crate::config::ToolNames;
use crate::diagnostics::ToolKind;
use crate::error::BuildError;
use crate::request::{BuildRequest, OutputFormat};
use crate::tool::{InvocationResult, ToolInvoker, ToolSpec};

/// Single-shot format conversions run after the text stage converged.
pub struct ConversionPipeline<'a> {
    invoker: &'a ToolInvoker<'a>,
    tools: &'a ToolNames,
}

impl<'a> ConversionPipeline<'a> {
    pub fn new(invoker: &'a ToolInvoker<'a>, tools: &'a ToolNames) -> Self {
        Self { invoker, tools }
    }

    /// Stages needed to reach `format` from the compiler's dvi output.
    pub fn stages(&self, request: &BuildRequest) -> Vec<ToolSpec> {
        let to_ps = ToolSpec::new(
            ToolKind::PostscriptConversion,
            &self.tools.dvips,
            request.base_file("dvi"),
        )
        .with_args(["-Ppdf"]);
        let to_pdf = ToolSpec::new(
            ToolKind::PdfConversion,
            &self.tools.ps2pdf,
            request.base_file("ps"),
        );
        match request.format {
            OutputFormat::Dvi => Vec::new(),
            OutputFormat::Ps => vec![to_ps],
            OutputFormat::Pdf => vec![to_ps, to_pdf],
        }
    }

    /// Run each stage once, in order. The first failure aborts the rest.
    pub async fn run(&self, request: &BuildRequest) -> Result<Vec<InvocationResult>, BuildError> {
        let mut results = Vec::new();
        for stage in self.stages(request) {
            info!(
                executable = %stage.executable,
                input = %stage.input.display(),
                "[CONVERT] Running conversion stage"
            );
            results.push(self.invoker.invoke(&stage).await?);
        }
        Ok(results)
    }
}
