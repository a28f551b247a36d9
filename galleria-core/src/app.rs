use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use crate::errors::GalleryError;
use crate::hooks::{collect_method_hooks, AfterHook, BeforeHook, ErrorHook};
use crate::{
    GalleryConfig, GalleryConfigSnapshot, HookContext, HookResult, ServiceHooks, ServiceMethodKind,
    TenantContext, TenantService,
};

struct GalleryAppInner<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    services: RwLock<HashMap<String, Arc<dyn TenantService<R, P>>>>,
    global_hooks: RwLock<ServiceHooks<R, P>>,
    service_hooks: RwLock<HashMap<String, ServiceHooks<R, P>>>,
    config: RwLock<GalleryConfig>,
}

/// Central application container.
///
/// Holds the service registry, app and per-service hooks, and config.
/// Cloning is cheap; clones share state.
pub struct GalleryApp<R, P = ()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    inner: Arc<GalleryAppInner<R, P>>,
}

impl<R, P> Default for GalleryApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> Clone for GalleryApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, P> GalleryApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GalleryAppInner {
                services: RwLock::new(HashMap::new()),
                global_hooks: RwLock::new(ServiceHooks::new()),
                service_hooks: RwLock::new(HashMap::new()),
                config: RwLock::new(GalleryConfig::new()),
            }),
        }
    }

    pub fn register_service<S>(&self, name: S, service: Arc<dyn TenantService<R, P>>)
    where
        S: Into<String>,
    {
        self.inner.services.write().insert(name.into(), service);
    }

    /// App-wide hooks, run before any service hooks.
    pub fn hooks<F>(&self, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut g = self.inner.global_hooks.write();
        f(&mut g);
    }

    pub(crate) fn configure_service_hooks<F>(&self, service_name: &str, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut map = self.inner.service_hooks.write();
        let hooks = map.entry(service_name.to_string()).or_default();
        f(hooks);
    }

    pub fn service(&self, name: &str) -> Result<ServiceHandle<R, P>> {
        let svc = self
            .inner
            .services
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| GalleryError::not_found(format!("Service not found: {name}")).into_anyhow())?;

        Ok(ServiceHandle {
            app: self.clone(),
            name: name.to_string(),
            service: svc,
        })
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.config.write().set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.config.read().get(key).map(|v| v.to_string())
    }

    /// Merge an externally built config (e.g. loaded from the environment).
    pub fn configure(&self, config: &GalleryConfig) {
        self.inner.config.write().merge(config);
    }

    pub fn config_snapshot(&self) -> GalleryConfigSnapshot {
        self.inner.config.read().snapshot()
    }
}

/// A named service bound to its app; every call runs the hook pipeline.
pub struct ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    app: GalleryApp<R, P>,
    name: String,
    service: Arc<dyn TenantService<R, P>>,
}

struct MethodHooks<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    before: Vec<Arc<dyn BeforeHook<R, P>>>,
    after: Vec<Arc<dyn AfterHook<R, P>>>,
    error: Vec<Arc<dyn ErrorHook<R, P>>>,
}

enum Invocation {
    Find,
    Get(String),
    Create,
    Update(String),
    Patch(Option<String>),
    Remove(Option<String>),
}

impl Invocation {
    fn method(&self) -> ServiceMethodKind {
        match self {
            Invocation::Find => ServiceMethodKind::Find,
            Invocation::Get(_) => ServiceMethodKind::Get,
            Invocation::Create => ServiceMethodKind::Create,
            Invocation::Update(_) => ServiceMethodKind::Update,
            Invocation::Patch(_) => ServiceMethodKind::Patch,
            Invocation::Remove(_) => ServiceMethodKind::Remove,
        }
    }
}

impl<R, P> ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn hooks<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        self.app.configure_service_hooks(&self.name, f);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner(&self) -> &Arc<dyn TenantService<R, P>> {
        &self.service
    }

    /// Global hooks first, then the service's own.
    fn collect_hooks(&self, method: &ServiceMethodKind) -> MethodHooks<R, P> {
        let g = self.app.inner.global_hooks.read();
        let map = self.app.inner.service_hooks.read();

        let mut before = collect_method_hooks(&g.before_all, &g.before_by_method, method);
        let mut after = collect_method_hooks(&g.after_all, &g.after_by_method, method);
        let mut error = collect_method_hooks(&g.error_all, &g.error_by_method, method);

        if let Some(h) = map.get(&self.name) {
            before.extend(collect_method_hooks(&h.before_all, &h.before_by_method, method));
            after.extend(collect_method_hooks(&h.after_all, &h.after_by_method, method));
            error.extend(collect_method_hooks(&h.error_all, &h.error_by_method, method));
        }

        MethodHooks { before, after, error }
    }

    fn context(&self, tenant: TenantContext, method: ServiceMethodKind, params: P, data: Option<R>) -> HookContext<R, P> {
        let mut ctx = HookContext::new(
            tenant,
            method,
            params,
            ServiceCaller::new(self.app.clone()),
            self.app.config_snapshot(),
        );
        ctx.data = data;
        ctx
    }

    async fn invoke(&self, call: &Invocation, ctx: &mut HookContext<R, P>) -> Result<()> {
        let svc = &self.service;
        let result = match call {
            Invocation::Find => HookResult::Many(svc.find(&ctx.tenant, ctx.params.clone()).await?),
            Invocation::Get(id) => HookResult::One(svc.get(&ctx.tenant, id, ctx.params.clone()).await?),
            Invocation::Create => {
                let data = take_data(ctx, "create")?;
                HookResult::One(svc.create(&ctx.tenant, data, ctx.params.clone()).await?)
            }
            Invocation::Update(id) => {
                let data = take_data(ctx, "update")?;
                HookResult::One(svc.update(&ctx.tenant, id, data, ctx.params.clone()).await?)
            }
            Invocation::Patch(id) => {
                let data = take_data(ctx, "patch")?;
                HookResult::One(svc.patch(&ctx.tenant, id.as_deref(), data, ctx.params.clone()).await?)
            }
            Invocation::Remove(id) => {
                HookResult::One(svc.remove(&ctx.tenant, id.as_deref(), ctx.params.clone()).await?)
            }
        };
        ctx.result = Some(result);
        Ok(())
    }

    async fn run_stages(&self, hooks: &MethodHooks<R, P>, call: &Invocation, ctx: &mut HookContext<R, P>) -> Result<()> {
        for h in &hooks.before {
            h.run(ctx).await?;
        }
        // A before hook may answer the call itself by setting a result.
        if ctx.result.is_none() {
            self.invoke(call, ctx).await?;
        }
        for h in &hooks.after {
            h.run(ctx).await?;
        }
        Ok(())
    }

    /// before -> service -> after, with error hooks on failure.
    async fn run_pipeline(&self, call: Invocation, mut ctx: HookContext<R, P>) -> Result<HookResult<R>> {
        let hooks = self.collect_hooks(&call.method());

        if let Err(e) = self.run_stages(&hooks, &call, &mut ctx).await {
            ctx.error = Some(e);
            for h in &hooks.error {
                if let Err(hook_err) = h.run(&mut ctx).await {
                    tracing::warn!(service = %self.name, error = %hook_err, "error hook failed");
                }
            }
            if let Some(err) = ctx.error.take() {
                return Err(err);
            }
        }

        ctx.result.ok_or_else(|| {
            GalleryError::general_error(format!("{}.{} produced no result", self.name, call.method().as_str()))
                .into_anyhow()
        })
    }

    pub async fn find(&self, tenant: TenantContext, params: P) -> Result<Vec<R>> {
        let ctx = self.context(tenant, ServiceMethodKind::Find, params, None);
        match self.run_pipeline(Invocation::Find, ctx).await? {
            HookResult::Many(v) => Ok(v),
            HookResult::One(v) => Ok(vec![v]),
        }
    }

    pub async fn get(&self, tenant: TenantContext, id: &str, params: P) -> Result<R> {
        let ctx = self.context(tenant, ServiceMethodKind::Get, params, None);
        one(self.run_pipeline(Invocation::Get(id.to_string()), ctx).await?, "get")
    }

    pub async fn create(&self, tenant: TenantContext, data: R, params: P) -> Result<R> {
        let ctx = self.context(tenant, ServiceMethodKind::Create, params, Some(data));
        one(self.run_pipeline(Invocation::Create, ctx).await?, "create")
    }

    pub async fn update(&self, tenant: TenantContext, id: &str, data: R, params: P) -> Result<R> {
        let ctx = self.context(tenant, ServiceMethodKind::Update, params, Some(data));
        one(self.run_pipeline(Invocation::Update(id.to_string()), ctx).await?, "update")
    }

    pub async fn patch(&self, tenant: TenantContext, id: Option<&str>, data: R, params: P) -> Result<R> {
        let ctx = self.context(tenant, ServiceMethodKind::Patch, params, Some(data));
        one(self.run_pipeline(Invocation::Patch(id.map(str::to_string)), ctx).await?, "patch")
    }

    pub async fn remove(&self, tenant: TenantContext, id: Option<&str>, params: P) -> Result<R> {
        let ctx = self.context(tenant, ServiceMethodKind::Remove, params, None);
        one(self.run_pipeline(Invocation::Remove(id.map(str::to_string)), ctx).await?, "remove")
    }
}

fn take_data<R, P>(ctx: &mut HookContext<R, P>, method: &str) -> Result<R>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    ctx.data
        .take()
        .ok_or_else(|| GalleryError::bad_request(format!("{method}() requires data")).into_anyhow())
}

fn one<R>(result: HookResult<R>, method: &str) -> Result<R> {
    match result {
        HookResult::One(v) => Ok(v),
        HookResult::Many(_) => Err(GalleryError::general_error(format!(
            "{method}() produced many results unexpectedly"
        ))
        .into_anyhow()),
    }
}

/// Lets hooks call other services of the same app through their pipeline.
pub struct ServiceCaller<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    app: GalleryApp<R, P>,
}

impl<R, P> Clone for ServiceCaller<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
        }
    }
}

impl<R, P> ServiceCaller<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new(app: GalleryApp<R, P>) -> Self {
        Self { app }
    }

    pub fn service(&self, name: &str) -> Result<ServiceHandle<R, P>> {
        self.app.service(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AfterHook, BeforeHook, ErrorHook};
    use async_trait::async_trait;

    #[derive(Default)]
    struct Notes {
        rows: RwLock<Vec<(String, String)>>,
    }

    #[async_trait]
    impl TenantService<String, ()> for Notes {
        async fn find(&self, ctx: &TenantContext, _params: ()) -> Result<Vec<String>> {
            Ok(self
                .rows
                .read()
                .iter()
                .filter(|(t, _)| t == ctx.id())
                .map(|(_, n)| n.clone())
                .collect())
        }

        async fn create(&self, ctx: &TenantContext, data: String, _params: ()) -> Result<String> {
            if data == "boom" {
                return Err(anyhow::anyhow!("boom"));
            }
            self.rows.write().push((ctx.id().to_string(), data.clone()));
            Ok(data)
        }
    }

    struct Upper;

    #[async_trait]
    impl BeforeHook<String, ()> for Upper {
        async fn run(&self, ctx: &mut HookContext<String, ()>) -> Result<()> {
            if let Some(d) = ctx.data.as_mut() {
                *d = d.to_uppercase();
            }
            Ok(())
        }
    }

    struct Suffix;

    #[async_trait]
    impl AfterHook<String, ()> for Suffix {
        async fn run(&self, ctx: &mut HookContext<String, ()>) -> Result<()> {
            if let Some(HookResult::One(v)) = ctx.result.as_mut() {
                v.push('!');
            }
            Ok(())
        }
    }

    struct Recover;

    #[async_trait]
    impl ErrorHook<String, ()> for Recover {
        async fn run(&self, ctx: &mut HookContext<String, ()>) -> Result<()> {
            ctx.error = None;
            ctx.result = Some(HookResult::One("recovered".to_string()));
            Ok(())
        }
    }

    fn app() -> GalleryApp<String, ()> {
        let app = GalleryApp::new();
        app.register_service("notes", Arc::new(Notes::default()));
        app
    }

    #[tokio::test]
    async fn reads_are_scoped_to_the_calling_tenant() {
        let app = app();
        let notes = app.service("notes").unwrap();
        notes.create(TenantContext::new("a"), "one".into(), ()).await.unwrap();
        notes.create(TenantContext::new("b"), "two".into(), ()).await.unwrap();

        assert_eq!(notes.find(TenantContext::new("a"), ()).await.unwrap(), vec!["one"]);
        assert_eq!(notes.find(TenantContext::new("b"), ()).await.unwrap(), vec!["two"]);
    }

    #[tokio::test]
    async fn before_and_after_hooks_wrap_the_call() {
        let app = app();
        app.hooks(|h| {
            h.before_create(Arc::new(Upper));
        });
        let notes = app.service("notes").unwrap().hooks(|h| {
            h.after_create(Arc::new(Suffix));
        });

        let out = notes.create(TenantContext::new("a"), "hi".into(), ()).await.unwrap();
        assert_eq!(out, "HI!");
    }

    #[tokio::test]
    async fn error_hooks_can_recover() {
        let app = app();
        let notes = app.service("notes").unwrap();

        let err = notes.create(TenantContext::new("a"), "boom".into(), ()).await.unwrap_err();
        assert!(err.to_string().contains("boom"));

        let notes = notes.hooks(|h| {
            h.error(ServiceMethodKind::Create, Arc::new(Recover));
        });
        let out = notes.create(TenantContext::new("a"), "boom".into(), ()).await.unwrap();
        assert_eq!(out, "recovered");
    }

    #[tokio::test]
    async fn unimplemented_methods_are_not_allowed() {
        let app = app();
        let err = app
            .service("notes")
            .unwrap()
            .remove(TenantContext::new("a"), Some("x"), ())
            .await
            .unwrap_err();
        assert_eq!(GalleryError::find_in(&err).unwrap().code(), 405);
        assert!(app.service("missing").is_err());
    }
}
