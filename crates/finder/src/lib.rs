//! # Data Source Finder
//!
//! Locates and loads a project's database configuration module without an
//! exact file path.
//!
//! ## Pipeline
//!
//! ```text
//! LookupContext (file name, directory, layout hints)
//!     │
//!     ├──> Candidate Planner
//!     │      ├─> base names: hint, then "data-source"
//!     │      ├─> {dir}/{name}, src/{name}, src/{db,database}/{name}
//!     │      └─> layout adjustment (tsconfig aliases, outDir)
//!     │
//!     └──> Resolver (one candidate at a time)
//!            ├─> locate {candidate}.{js,cjs,mjs,ts,cts,mts}
//!            ├─> load module (executes it)
//!            └─> whole result → default export → named exports
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use datasource_finder::{
//!     DataSourceFinder, InstanceOfPredicate, LookupContext, RuntimeModuleLoader,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let finder = DataSourceFinder::new(
//!         RuntimeModuleLoader::new("node").with_args(["--import", "tsx"]),
//!         InstanceOfPredicate::data_source(),
//!     );
//!
//!     let ctx = LookupContext::new().with_file_name("ormconfig.ts");
//!     match finder.find(&ctx).await? {
//!         Some(found) => println!("{} ({:?})", found.path.display(), found.export),
//!         None => println!("no data source configured"),
//!     }
//!     Ok(())
//! }
//! ```

mod adjust;
mod context;
mod error;
mod exports;
mod finder;
mod loader;
mod locate;
mod plan;
mod transform;
mod tsconfig;

pub use adjust::{OutDirAdjuster, PathAdjuster};
pub use context::{LookupContext, ProjectLayout};
pub use error::{AdjustError, FindError, LayoutError, LoadError, LocateError, Result};
pub use exports::{
    select_instance, ExportShape, ExportSlot, InstanceOfPredicate, InstancePredicate,
    DEFAULT_EXPORT_KEY, INSTANCE_MARKER_KEY,
};
pub use finder::{find_data_source, DataSourceFinder, FoundInstance};
pub use loader::{parse_runtime_output, ModuleLoader, RuntimeModuleLoader, MODULE_PATH_ENV};
pub use locate::{extension_pattern, FileLocator, GlobLocator, DEFAULT_IGNORE, MODULE_EXTENSIONS};
pub use plan::{
    expand_candidates, posix_join, strip_file_extension, Adjustment, CandidatePlanner,
    DirectoryHint, SearchPlan, DEFAULT_BASE_NAME, HINT_EXTENSIONS,
};
pub use transform::{CodeTransformation, CODE_TRANSFORMATION_ENV};
pub use tsconfig::{parse_tsconfig, CompilerOptions, LayoutReader, TsConfig, TsConfigReader};
