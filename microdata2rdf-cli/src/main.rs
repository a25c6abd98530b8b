use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use microdata2rdf::{Extractor, Extras, Options, Registry};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Document to extract Microdata from (`http:`, `https:` or `file:`).
    #[arg(value_name = "URL")]
    target: url::Url,

    /// Extra triples to generate, on top of the plain Microdata model.
    #[arg(long = "extra", value_enum, value_name = "EXTRA")]
    extras: Vec<Extra>,

    /// Generate every kind of extra triple.
    #[arg(long, conflicts_with = "extras")]
    all: bool,

    /// Vocabulary registry to use instead of the built-in one (path or URL).
    #[arg(long, value_name = "PATH|URL")]
    registry: Option<String>,

    /// Base IRI of the document, if different from its URL.
    #[arg(long, value_name = "IRI")]
    base: Option<String>,

    /// Fixed prefix for generated blank node labels.
    #[arg(long, value_name = "PREFIX")]
    bnode_prefix: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Extra {
    PropertyUri,
    MultipleValues,
    VocabExpansion,
    Datatype,
    TopItems,
    UsesVocabulary,
    VocabEntailment,
}

impl From<Extra> for Extras {
    fn from(extra: Extra) -> Self {
        match extra {
            Extra::PropertyUri => Extras::PROPERTY_URI,
            Extra::MultipleValues => Extras::MULTIPLE_VALUES,
            Extra::VocabExpansion => Extras::VOCAB_EXPANSION,
            Extra::Datatype => Extras::DATATYPE,
            Extra::TopItems => Extras::TOP_ITEMS,
            Extra::UsesVocabulary => Extras::USES_VOCABULARY,
            Extra::VocabEntailment => Extras::VOCAB_ENTAILMENT,
        }
    }
}

impl Args {
    fn extras(&self) -> Extras {
        if self.all {
            Extras::ALL
        } else if self.extras.is_empty() {
            Extras::default()
        } else {
            self.extras
                .iter()
                .fold(Extras::NONE, |acc, extra| acc | Extras::from(*extra))
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = reqwest::blocking::Client::new();

    let registry = match &args.registry {
        None => None,
        Some(location) if location.starts_with("http:") || location.starts_with("https:") => {
            let json = client.get(location).send()?.error_for_status()?.text()?;
            Some(Registry::from_json(&json)?)
        }
        Some(path) => Some(Registry::from_path(path)?),
    };
    let registry = registry_or_builtin(registry.as_ref());

    let base = args.base.clone().unwrap_or_else(|| args.target.to_string());
    let base_iri = oxiri::Iri::parse(base.clone())?;

    let Some(content) = fetch(&client, &args.target)? else {
        return Ok(ExitCode::FAILURE);
    };

    let mut options = Options::with_extras(args.extras());
    options.blank_node_prefix = args.bnode_prefix;
    let extractor = Extractor::new(registry, options);

    let mut output_graph = oxrdf::Graph::new();
    let mut processor_graph = oxrdf::Graph::new();
    let count = microdata2rdf::process(
        &content,
        base_iri,
        &extractor,
        &mut output_graph,
        &mut processor_graph,
    )?;
    tracing::info!(triples = count, "extraction complete");

    {
        // output any warnings/errors
        let serializer = oxttl::TurtleSerializer::new();
        let mut locked_err = std::io::stderr().lock();
        let mut writer = serializer.for_writer(&mut locked_err);
        for triple in processor_graph.iter() {
            writer.serialize_triple(triple)?;
        }

        writer.finish()?;
    }

    {
        let serializer = microdata2rdf::well_known_prefixes().mappings().try_fold(
            oxttl::TurtleSerializer::new().with_base_iri(base)?,
            |serializer, (prefix, value)| serializer.with_prefix(prefix, value),
        )?;

        let mut locked_out = std::io::stdout().lock();
        let mut writer = serializer.for_writer(&mut locked_out);
        for triple in output_graph.iter() {
            writer.serialize_triple(triple)?;
        }

        writer.finish()?;
    }

    Ok(ExitCode::SUCCESS)
}

fn registry_or_builtin(loaded: Option<&Registry>) -> &Registry {
    loaded.unwrap_or(Registry::builtin())
}

/// Reads the target document; `None` when it is not HTML.
fn fetch(
    client: &reqwest::blocking::Client,
    target: &url::Url,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if target.scheme() == "file" {
        let path = target
            .to_file_path()
            .map_err(|()| format!("not a local file path: {target}"))?;
        return Ok(Some(std::fs::read_to_string(path)?));
    }

    let response = client.get(target.clone()).send()?.error_for_status()?;
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    if content_type.is_some_and(|ct| !ct.starts_with("text/html")) {
        eprintln!("Error: content type is not text/html.");
        return Ok(None);
    }

    Ok(Some(response.text()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extras_from_arguments() {
        let args = Args::parse_from(["microdata2rdf", "file:///tmp/page.html"]);
        assert_eq!(args.extras(), Extras::PROPERTY_URI);

        let args = Args::parse_from([
            "microdata2rdf",
            "--extra",
            "multiple-values",
            "--extra",
            "datatype",
            "file:///tmp/page.html",
        ]);
        assert_eq!(args.extras(), Extras::MULTIPLE_VALUES | Extras::DATATYPE);

        let args = Args::parse_from(["microdata2rdf", "--all", "file:///tmp/page.html"]);
        assert_eq!(args.extras(), Extras::ALL);
    }

    #[test]
    fn loaded_registry_replaces_builtin() {
        let loaded = Registry::empty();
        assert!(registry_or_builtin(Some(&loaded)).is_empty());
        assert_eq!(registry_or_builtin(None).len(), 3);
    }
}
