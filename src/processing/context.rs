use crate::cloud::rekognition::FaceCollection;
use crate::cloud::storage::ObjectStore;
use crate::processing::identities::IdentityRegistry;
use crate::processing::settings::Settings;
use crate::stack::outputs::StackInfo;

/// Everything one matching run works with. Created at start-up and dropped
/// when the run ends; the identity registry is the only state that changes.
pub struct RunContext<C, S> {
    pub stack: StackInfo,
    pub settings: Settings,
    pub collection: C,
    pub storage: S,
    pub identities: IdentityRegistry,
}

impl<C: FaceCollection, S: ObjectStore> RunContext<C, S> {
    pub fn new(stack: StackInfo, settings: Settings, collection: C, storage: S) -> Self {
        Self {
            stack,
            settings,
            collection,
            storage,
            identities: IdentityRegistry::new(),
        }
    }
}
