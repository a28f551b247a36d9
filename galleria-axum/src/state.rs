use std::sync::Arc;

use galleria_core::{GalleryApp, TenantResolver};

pub struct GalleryAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: Arc<GalleryApp<R, P>>,
    pub resolver: Arc<TenantResolver>,
}

impl<R, P> Clone for GalleryAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            resolver: Arc::clone(&self.resolver),
        }
    }
}
