use crate::bundle::BundleSignals;
use crate::descriptor::Descriptor;
use crate::loader::LoaderIdentity;
use serde::Serialize;

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub signals: BundleSignals,
    pub identity: LoaderIdentity,
    pub descriptor: Descriptor,
    /// Name used for the descriptor and its output file.
    pub display_name: String,
}
