//! Command-line interface for xmlschema-completion

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::sync::Arc;
#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "cli")]
use xmlschema_completion::{
    CandidateSet, CompletionEngine, Document, ElementDeclaration, GrammarRegistry, Location, QName,
    ValidationSettings,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsd-complete")]
#[command(author, version, about = "XML Schema content-model completion tool", long_about = None)]
struct Cli {
    /// XML Schema version used to compile grammars: 1.0 or 1.1
    #[arg(long, global = true, default_value = "1.0")]
    xsd_version: String,

    /// Output as JSON
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the child elements permitted in an element
    Children {
        /// Path to the XSD schema file
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Global element whose children are listed
        #[arg(short, long)]
        element: String,

        /// Comma-separated children already written, in order
        #[arg(short, long, value_delimiter = ',')]
        after: Vec<String>,
    },

    /// List the child elements permitted at a caret offset of a document
    At {
        /// Path to the XSD schema file (defaults to the document's xsi hints)
        #[arg(short, long, value_name = "SCHEMA")]
        schema: Option<PathBuf>,

        /// Path to the XML document
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// Byte offset of the caret
        #[arg(short, long)]
        offset: usize,
    },

    /// Show documentation, attributes and enumerations of an element
    Inspect {
        /// Path to the XSD schema file
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Global element to inspect
        #[arg(short, long)]
        element: String,
    },
}

#[cfg(feature = "cli")]
fn main() {
    // stdout carries the results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xmlschema_completion=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = build_registry(&cli.xsd_version).and_then(|registry| match cli.command {
        Commands::Children {
            schema,
            element,
            after,
        } => cmd_children(&registry, schema, &element, &after, cli.json),
        Commands::At {
            schema,
            file,
            offset,
        } => cmd_at(&registry, schema, file, offset, cli.json),
        Commands::Inspect { schema, element } => cmd_inspect(&registry, schema, &element, cli.json),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[cfg(feature = "cli")]
fn build_registry(xsd_version: &str) -> CliResult<GrammarRegistry> {
    let json = serde_json::json!({ "schemaVersion": xsd_version }).to_string();
    let settings = ValidationSettings::from_json(&json)?;
    Ok(GrammarRegistry::new().with_settings(settings))
}

#[cfg(feature = "cli")]
fn load_engine(registry: &GrammarRegistry, schema: &Location) -> CliResult<CompletionEngine> {
    let grammar = registry.load_grammar(std::slice::from_ref(schema))?;
    for error in grammar.errors() {
        eprintln!("warning: {}", error);
    }
    Ok(CompletionEngine::new(grammar))
}

#[cfg(feature = "cli")]
fn find_global(engine: &CompletionEngine, name: &str) -> CliResult<Arc<ElementDeclaration>> {
    let grammar = engine.grammar();
    grammar
        .global_elements()
        .filter_map(|id| grammar.declaration(id))
        .find(|decl| decl.name() == name || decl.qname().to_string() == name)
        .ok_or_else(|| format!("Element '{}' not found in schema", name).into())
}

/// Name of a child as declared in `parent`, falling back to a global element
#[cfg(feature = "cli")]
fn child_name(engine: &CompletionEngine, parent: &ElementDeclaration, name: &str) -> QName {
    if let Some(decl) = parent.find_element(name, None) {
        return decl.qname().clone();
    }
    engine
        .root_candidates()
        .elements()
        .iter()
        .find(|decl| decl.name() == name)
        .map(|decl| decl.qname().clone())
        .unwrap_or_else(|| QName::local(name))
}

#[cfg(feature = "cli")]
fn cmd_children(
    registry: &GrammarRegistry,
    schema: PathBuf,
    element: &str,
    after: &[String],
    json_output: bool,
) -> CliResult<()> {
    let engine = load_engine(registry, &Location::path(schema))?;
    let parent = find_global(&engine, element)?;
    let closed: Vec<QName> = after
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| child_name(&engine, &parent, name))
        .collect();

    let candidates = engine.possible_elements_after(parent.type_id(), &closed);
    print_candidates(&candidates, json_output)
}

#[cfg(feature = "cli")]
fn cmd_at(
    registry: &GrammarRegistry,
    schema: Option<PathBuf>,
    file: PathBuf,
    offset: usize,
    json_output: bool,
) -> CliResult<()> {
    let text = fs::read_to_string(&file)?;
    let document = Document::parse(&text);

    let schema = match schema {
        Some(schema) => Location::path(schema),
        None => {
            let hint = document
                .schema_location_hints()
                .into_iter()
                .next()
                .ok_or("no --schema given and the document has no schema location hint")?;
            Location::path(&file).resolve(&hint)?
        }
    };

    let engine = load_engine(registry, &schema)?;
    let candidates = engine.possible_elements(&document, offset);
    print_candidates(&candidates, json_output)
}

#[cfg(feature = "cli")]
fn cmd_inspect(
    registry: &GrammarRegistry,
    schema: PathBuf,
    element: &str,
    json_output: bool,
) -> CliResult<()> {
    let engine = load_engine(registry, &Location::path(schema))?;
    let decl = find_global(&engine, element)?;

    if json_output {
        let attributes: Vec<serde_json::Value> = decl
            .attributes()
            .iter()
            .map(|attr| {
                serde_json::json!({
                    "name": attr.name.to_string(),
                    "type": attr.type_name.as_ref().map(|t| t.to_string()),
                    "required": attr.required,
                    "default": attr.default_value,
                    "fixed": attr.fixed_value,
                    "enumeration": attr.enumeration,
                })
            })
            .collect();
        let json = serde_json::json!({
            "name": decl.qname().to_string(),
            "localName": decl.name(),
            "namespace": decl.namespace(),
            "abstract": decl.is_abstract(),
            "nillable": decl.is_nillable(),
            "documentation": decl.documentation(),
            "attributes": attributes,
            "children": decl.elements().iter().map(|d| d.qname().to_string()).collect::<Vec<_>>(),
            "enumeration": decl.enumeration_values(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("Element: {}", decl.qname());
    if let Some(ns) = decl.namespace() {
        println!("  Namespace: {}", ns);
    }
    println!("  Abstract: {}", decl.is_abstract());
    println!("  Nillable: {}", decl.is_nillable());
    if let Some(doc) = decl.documentation() {
        println!("  Documentation: {}", doc);
    }

    if !decl.attributes().is_empty() {
        println!("\n=== Attributes ===");
        for attr in decl.attributes() {
            let use_str = if attr.required { "required" } else { "optional" };
            println!("  {} ({})", attr.name, use_str);
            if !attr.enumeration.is_empty() {
                println!("    values: {}", attr.enumeration.join(", "));
            }
        }
    }

    let children = decl.elements();
    if !children.is_empty() {
        println!("\n=== Children ===");
        for child in children {
            println!("  {}", child.qname());
        }
    }

    if !decl.enumeration_values().is_empty() {
        println!("\n=== Enumeration ===");
        for value in decl.enumeration_values() {
            println!("  {}", value);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_candidates(candidates: &CandidateSet, json_output: bool) -> CliResult<()> {
    if json_output {
        let elements: Vec<serde_json::Value> = candidates
            .elements()
            .iter()
            .map(|decl| {
                serde_json::json!({
                    "name": decl.name(),
                    "namespace": decl.namespace(),
                    "documentation": decl.documentation(),
                })
            })
            .collect();
        let json = serde_json::json!({
            "elements": elements,
            "anyElement": candidates.accepts_any_element(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("(no elements permitted)");
        return Ok(());
    }
    for decl in candidates.elements() {
        match decl.documentation() {
            Some(doc) => println!("{}  - {}", decl.qname(), doc),
            None => println!("{}", decl.qname()),
        }
    }
    if candidates.accepts_any_element() {
        println!("(any element)");
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
