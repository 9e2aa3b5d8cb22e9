//! Mounts declared components through the component factory.

use async_trait::async_trait;
use pw_02_component_factory::ComponentFactory;
use shared_types::Target;

use crate::ports::ComponentMounter;

#[async_trait]
impl ComponentMounter for ComponentFactory {
    async fn mount(&self, root: &Target) -> usize {
        self.auto_create(root).await.len()
    }
}
