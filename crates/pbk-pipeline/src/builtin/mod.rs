//! Reference implementations of the pipeline collaborators.

mod annotator;
mod compiler;
mod template;
mod validator;

pub use annotator::OntologyAnnotator;
pub use compiler::ReactionNetworkCompiler;
pub use template::EntityTemplateGenerator;
pub use validator::ConventionValidator;
