use microdata2rdf::html::items_from_html;
use microdata2rdf::{Extractor, Extras, Item, LiteralValue, Object, Options, Registry};
use oxiri::Iri;
use oxrdf::{Graph, TermRef};

mod utils;

fn base() -> Iri<String> {
    Iri::parse(utils::BASE.to_string()).unwrap()
}

fn process(html: &str) -> (usize, Graph, Graph) {
    let extractor = Extractor::new(Registry::builtin(), Options::default());
    let mut output_graph = Graph::new();
    let mut processor_graph = Graph::new();
    let count = microdata2rdf::process(html, base(), &extractor, &mut output_graph, &mut processor_graph)
        .unwrap();
    (count, output_graph, processor_graph)
}

fn has_type(graph: &Graph, ty: oxrdf::NamedNodeRef<'_>) -> bool {
    graph
        .iter()
        .any(|t| t.predicate == oxrdf::vocab::rdf::TYPE && t.object == TermRef::NamedNode(ty))
}

#[test]
fn person() {
    utils::assert_html(
        r#"
        <div itemscope itemtype="http://schema.org/Person">
          <span itemprop="name">Alice</span>
          <a itemprop="url" href="/alice">home</a>
        </div>
        "#,
        Extras::default(),
        r#"
        @prefix schema: <http://schema.org/> .
        [] a schema:Person ;
            schema:name "Alice" ;
            schema:url <http://example.org/alice> .
        "#,
    );
}

#[test]
fn nested_items_own_their_properties() {
    utils::assert_html(
        r#"
        <div itemscope itemtype="http://schema.org/Person">
          <span itemprop="name">Alice</span>
          <div itemprop="address" itemscope itemtype="http://schema.org/PostalAddress">
            <span itemprop="addressLocality">Springfield</span>
          </div>
          <div itemprop="knows" itemscope>
            <span itemprop="name">Bob</span>
          </div>
        </div>
        "#,
        Extras::default(),
        r#"
        @prefix schema: <http://schema.org/> .
        [] a schema:Person ;
            schema:name "Alice" ;
            schema:address [ a schema:PostalAddress ; schema:addressLocality "Springfield" ] ;
            schema:knows [ schema:name "Bob" ] .
        "#,
    );
}

#[test]
fn itemref_pulls_in_properties() {
    utils::assert_html(
        r#"
        <div itemscope itemtype="http://schema.org/Person" itemref="job">
          <span itemprop="name">Alice</span>
        </div>
        <p id="job" itemprop="jobTitle">Engineer</p>
        "#,
        Extras::default(),
        r#"
        @prefix schema: <http://schema.org/> .
        [] a schema:Person ;
            schema:name "Alice" ;
            schema:jobTitle "Engineer" .
        "#,
    );
}

#[test]
fn element_values() {
    utils::assert_html(
        r#"
        <div itemscope itemtype="http://schema.org/Product">
          <meta itemprop="sku" content="W-1">
          <img itemprop="image" src="widget.png">
          <data itemprop="productID" value="123">one two three</data>
          <meter itemprop="ratingValue" value="4" min="0" max="5">4/5</meter>
          <link itemprop="availability" href="http://schema.org/InStock">
          <a itemprop="sameAs" href="http://[broken">broken</a>
        </div>
        "#,
        Extras::default(),
        r#"
        @prefix schema: <http://schema.org/> .
        [] a schema:Product ;
            schema:sku "W-1" ;
            schema:image <http://example.org/widget.png> ;
            schema:productID "123" ;
            schema:ratingValue "4" ;
            schema:availability schema:InStock ;
            schema:sameAs "" .
        "#,
    );
}

#[test]
fn time_values_are_typed() {
    utils::assert_html(
        r#"
        <div itemscope itemtype="http://schema.org/Event">
          <span itemprop="name">2014</span>
          <time itemprop="startDate" datetime="2014-07-10">July 10</time>
          <time itemprop="doorTime">19:30:00</time>
          <time itemprop="duration" datetime="PT2H">two hours</time>
        </div>
        "#,
        Extras::PROPERTY_URI | Extras::DATATYPE,
        r#"
        @prefix schema: <http://schema.org/> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
        [] a schema:Event ;
            schema:name "2014" ;
            schema:startDate "2014-07-10"^^xsd:date ;
            schema:doorTime "19:30:00"^^xsd:time ;
            schema:duration "PT2H"^^xsd:duration .
        "#,
    );
}

#[test]
fn language_comes_from_the_property_element() {
    utils::assert_html(
        r#"
        <div itemscope itemtype="http://schema.org/Thing" lang="de">
          <span itemprop="name" lang="fr">Bonjour</span>
          <span itemprop="description">Hallo</span>
        </div>
        "#,
        Extras::default(),
        r#"
        @prefix schema: <http://schema.org/> .
        [] a schema:Thing ;
            schema:name "Bonjour"@fr ;
            schema:description "Hallo" .
        "#,
    );
}

#[test]
fn itemid_names_the_item() {
    utils::assert_html(
        r##"
        <div itemscope itemtype="http://schema.org/Person" itemid="#me">
          <span itemprop="name">Alice</span>
        </div>
        "##,
        Extras::default(),
        r#"
        @prefix schema: <http://schema.org/> .
        <http://example.org/#me> a schema:Person ;
            schema:name "Alice" .
        "#,
    );
}

#[test]
fn ordered_values() {
    utils::assert_html(
        r#"
        <ol itemscope itemtype="http://schema.org/MusicPlaylist">
          <li itemprop="track">a</li>
          <li itemprop="track">b</li>
          <li itemprop="track">c</li>
        </ol>
        "#,
        Extras::PROPERTY_URI | Extras::MULTIPLE_VALUES,
        r#"
        @prefix schema: <http://schema.org/> .
        [] a schema:MusicPlaylist ;
            schema:track ( "a" "b" "c" ) .
        "#,
    );
}

#[test]
fn items_referenced_from_inside_themselves() {
    utils::assert_html(
        r#"
        <div itemscope itemtype="http://schema.org/Person">
          <div id="friend" itemprop="knows" itemscope>
            <span itemprop="name">Bob</span>
            <div itemprop="knows" itemscope itemref="friend"></div>
          </div>
        </div>
        "#,
        Extras::default(),
        r#"
        @prefix schema: <http://schema.org/> .
        [] a schema:Person ;
            schema:knows _:bob .
        _:bob schema:name "Bob" ;
            schema:knows [ schema:knows _:bob ] .
        "#,
    );
}

#[test]
fn base_element_changes_the_base() {
    let html = r#"
        <html>
          <head><base href="http://other.example/dir/"></head>
          <body>
            <div itemscope itemtype="http://schema.org/Person">
              <a itemprop="url" href="page">home</a>
            </div>
          </body>
        </html>
    "#;

    let extractor = Extractor::new(
        Registry::builtin(),
        Options::with_extras(Extras::PROPERTY_URI | Extras::TOP_ITEMS),
    );
    let triples = microdata2rdf::parse(html, base(), &extractor).unwrap();

    assert!(triples.iter().any(|t| t.predicate == "http://schema.org/url"
        && t.object == Object::iri("http://other.example/dir/page")));
    assert!(triples.iter().any(|t| t.predicate == "http://www.w3.org/ns/md#item"
        && t.subject == microdata2rdf::Subject::Iri("http://other.example/dir/".into())));
}

#[test]
fn invalid_base_is_a_document_error() {
    let html = r#"
        <html>
          <head><base href="http://[invalid/"></head>
          <body><div itemscope itemtype="http://schema.org/Person"></div></body>
        </html>
    "#;

    let (count, output_graph, processor_graph) = process(html);
    assert_eq!(count, 0);
    assert!(output_graph.is_empty());
    assert_eq!(processor_graph.len(), 2);
    assert!(has_type(&processor_graph, microdata2rdf::vocab::rdfa::DOCUMENT_ERROR));

    let extractor = Extractor::new(Registry::builtin(), Options::default());
    assert!(matches!(
        microdata2rdf::parse(html, base(), &extractor),
        Err(microdata2rdf::Error::IriParseError { .. })
    ));
}

#[test]
fn unrepresentable_triples_become_warnings() {
    let (count, output_graph, processor_graph) = process(
        r#"
        <div itemscope itemtype="http://schema.org/Person">
          <span itemprop="name" lang="not a tag!">Alice</span>
        </div>
        "#,
    );

    assert_eq!(count, 2);
    assert_eq!(output_graph.len(), 1);
    assert!(has_type(&processor_graph, microdata2rdf::vocab::rdfa::WARNING));
}

#[test]
fn discovered_items() {
    let document = items_from_html(
        r#"
        <div itemscope itemtype="http://schema.org/Person person">
          <span itemprop="name name alternateName">Alice</span>
        </div>
        <span itemprop="name">not in an item</span>
        <div itemscope></div>
        "#,
        base(),
    )
    .unwrap();

    assert_eq!(document.base.as_str(), utils::BASE);
    assert_eq!(
        document.items,
        [
            Item::new()
                .with_type("http://schema.org/Person")
                .with_property("name", LiteralValue::text("Alice").with_element("span"))
                .with_property(
                    "alternateName",
                    LiteralValue::text("Alice").with_element("span")
                ),
            Item::new(),
        ]
    );
}

#[test]
fn self_reference_labels_differ_between_documents() {
    let html = r#"
        <div itemscope itemtype="http://schema.org/Person">
          <div id="friend" itemprop="knows" itemscope>
            <div itemprop="knows" itemscope itemref="friend"></div>
          </div>
        </div>
    "#;

    let friend_id = || {
        let document = items_from_html(html, base()).unwrap();
        let microdata2rdf::PropertyValue::Item(friend) = &document.items[0].properties["knows"][0]
        else {
            panic!("knows is not an item");
        };
        friend.id.clone().unwrap()
    };

    let first = friend_id();
    let second = friend_id();
    assert!(first.starts_with("_:"));
    assert_ne!(first, second);
}
