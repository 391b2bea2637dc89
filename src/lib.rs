//! apidoc-extract - Endpoint documentation from annotated route handlers.
//!
//! Given the routes of a web application, this library derives a structured description of
//! every endpoint (group, title, parameters with example values, authentication flag and
//! example responses) from doc-comment annotations on the handlers:
//!
//! ```text
//! /// Show a car.
//! ///
//! /// @group Cars
//! /// @authenticated
//! /// @uriParam id integer The car id. Example: 4
//! /// @queryParam include Relations to load. No-example
//! /// @response {"id": 4, "make": "Tesla"}
//! ```
//!
//! # Architecture
//!
//! 1. [`docblock`] - Parses doc comments into descriptions and `@tags`
//! 2. [`types`] and [`literal`] - Parameter types, example synthesis and example casting
//! 3. [`params`] - `@uriParam`, `@bodyParam` and `@queryParam` extraction
//! 4. [`group`] - Group and title resolution
//! 5. [`response`] - The ordered response strategy chain
//! 6. [`generator`] - Assembles one [`generator::EndpointDescriptor`] per route
//! 7. [`reflection`] - The capability the generator uses to read handlers, with
//!    [`source`] and [`scanner`] implementing it over a Rust project
//! 8. [`config`] and [`route`] - Run settings and the route manifest
//! 9. [`serializer`] - YAML and JSON output
//!
//! # Example Usage
//!
//! ```no_run
//! use apidoc_extract::{
//!     config::DocumentationConfig,
//!     generator::{group_endpoints, Generator},
//!     response::ResponseResolver,
//!     serializer::{serialize_yaml, Documentation},
//!     source::SourceReflector,
//! };
//! use std::path::Path;
//!
//! let project = Path::new("./my-api");
//! let config = DocumentationConfig::load(&project.join("apidoc.yaml")).unwrap();
//! let reflector = SourceReflector::from_project(&config.sources_root(project), &config.exclude_dirs).unwrap();
//! let responses = ResponseResolver::standard(config.fixtures_root(project), None, None);
//!
//! let generator = Generator::new(&config, &reflector, responses);
//! let groups = group_endpoints(generator.process_routes(&config.routes));
//! println!("{}", serialize_yaml(&Documentation::new(groups)).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod config;
pub mod docblock;
pub mod error;
pub mod generator;
pub mod group;
pub mod literal;
pub mod params;
pub mod reflection;
pub mod response;
pub mod route;
pub mod scanner;
pub mod serializer;
pub mod source;
pub mod types;
