use serde::Serialize;
use serde_json::Value;
use std::env;
use std::path::PathBuf;

use crate::adjust::{OutDirAdjuster, PathAdjuster};
use crate::context::LookupContext;
use crate::error::{FindError, Result};
use crate::exports::{select_instance, ExportSlot, InstanceOfPredicate, InstancePredicate};
use crate::loader::{ModuleLoader, RuntimeModuleLoader};
use crate::locate::{extension_pattern, FileLocator, GlobLocator, DEFAULT_IGNORE, MODULE_EXTENSIONS};
use crate::plan::{Adjustment, CandidatePlanner, SearchPlan};
use crate::transform::CodeTransformation;
use crate::tsconfig::{LayoutReader, TsConfigReader};

/// A matched instance and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundInstance<V> {
    pub path: PathBuf,
    pub export: ExportSlot,
    pub value: V,
}

/// Locates and loads the first module exporting a matching instance.
///
/// Candidates are tried strictly one after another. A candidate with no file
/// (or a failing lookup) is skipped; a file that fails to load aborts the
/// whole call.
pub struct DataSourceFinder<L, P> {
    loader: L,
    predicate: P,
    locator: Box<dyn FileLocator>,
    adjuster: Box<dyn PathAdjuster>,
    layout_reader: Box<dyn LayoutReader>,
    planner: CandidatePlanner,
    root: Option<PathBuf>,
    extensions: Vec<String>,
    ignore: Vec<String>,
    transformation: CodeTransformation,
}

impl<L, P> DataSourceFinder<L, P>
where
    L: ModuleLoader,
    L::Exports: Clone,
    P: InstancePredicate<L::Exports>,
{
    pub fn new(loader: L, predicate: P) -> Self {
        Self {
            loader,
            predicate,
            locator: Box::new(GlobLocator),
            adjuster: Box::new(OutDirAdjuster),
            layout_reader: Box::new(TsConfigReader),
            planner: CandidatePlanner::default(),
            root: None,
            extensions: MODULE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignore: DEFAULT_IGNORE.iter().map(|e| e.to_string()).collect(),
            transformation: CodeTransformation::from_env(),
        }
    }

    /// Project root; defaults to the process working directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_locator(mut self, locator: impl FileLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    pub fn with_adjuster(mut self, adjuster: impl PathAdjuster + 'static) -> Self {
        self.adjuster = Box::new(adjuster);
        self
    }

    pub fn with_layout_reader(mut self, reader: impl LayoutReader + 'static) -> Self {
        self.layout_reader = Box::new(reader);
        self
    }

    pub fn with_fallback_name(mut self, name: impl Into<String>) -> Self {
        self.planner = CandidatePlanner::new(name);
        self
    }

    /// Accepted module extensions, in preference order, without the dot.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ignore<I, S>(mut self, ignore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = ignore.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_code_transformation(mut self, transformation: CodeTransformation) -> Self {
        self.transformation = transformation;
        self
    }

    fn root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => env::current_dir().map_err(FindError::InvalidRoot),
        }
    }

    /// Candidate paths and search roots for `ctx`, after layout adjustment.
    pub async fn plan(&self, ctx: &LookupContext) -> Result<SearchPlan> {
        let root = self.root()?;

        let layout = if ctx.preserve_file_paths {
            None
        } else {
            self.layout_reader.read(&root, &ctx.project_layout).await?
        };

        let adjustment = (!ctx.preserve_file_paths && !self.transformation.is_just_in_time())
            .then(|| Adjustment {
                adjuster: self.adjuster.as_ref(),
                layout: layout.as_ref(),
            });

        let plan = self.planner.plan(ctx, &root, adjustment)?;
        log::debug!(
            "Search plan: {} candidates over {} roots",
            plan.candidates.len(),
            plan.roots.len()
        );
        Ok(plan)
    }

    /// Resolve the first matching instance together with its origin.
    pub async fn find(&self, ctx: &LookupContext) -> Result<Option<FoundInstance<L::Exports>>> {
        let plan = self.plan(ctx).await?;

        for candidate in &plan.candidates {
            let pattern = extension_pattern(candidate, &self.extensions);
            let path = match self.locator.locate(&pattern, &plan.roots, &self.ignore).await {
                Ok(Some(path)) => path,
                Ok(None) => {
                    log::debug!("No file for {pattern}");
                    continue;
                }
                Err(err) => {
                    log::warn!("Lookup of {pattern} failed, skipping: {err}");
                    continue;
                }
            };

            let exports = self
                .loader
                .load(&path)
                .await
                .map_err(|source| FindError::Load {
                    path: path.clone(),
                    source,
                })?;

            if let Some((export, value)) = select_instance(&exports, &self.predicate) {
                log::info!("Found instance in {} ({export:?})", path.display());
                return Ok(Some(FoundInstance {
                    value: value.clone(),
                    path,
                    export,
                }));
            }

            log::debug!("{} exports no matching instance", path.display());
        }

        Ok(None)
    }

    /// Resolve the first matching instance. `Ok(None)` when nothing matched.
    pub async fn find_data_source(&self, ctx: &LookupContext) -> Result<Option<L::Exports>> {
        Ok(self.find(ctx).await?.map(|found| found.value))
    }
}

/// Resolve a `DataSource` from the working directory with the default
/// runtime loader.
pub async fn find_data_source(ctx: Option<LookupContext>) -> Result<Option<Value>> {
    let ctx = ctx.unwrap_or_default();
    let root = env::current_dir().map_err(FindError::InvalidRoot)?;
    DataSourceFinder::new(
        RuntimeModuleLoader::default().with_working_dir(&root),
        InstanceOfPredicate::data_source(),
    )
    .with_root(root)
    .find_data_source(&ctx)
    .await
}
