//! N-Triples to node/edge graph conversion.
//!
//! Every triple adds its own predicate node and two edges, subject to
//! predicate and predicate to object. Subjects and objects with the same
//! (rewritten) label share one node.

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Namespace prefixes shortened in node labels.
const NAMESPACES: [(&str, &str); 6] = [
    ("http://www.gsi.upm.es/ontologies/marl/ns#", "marl:"),
    ("http://www.gsi.upm.es/ontologies/onyx/ns#", "onyx:"),
    ("http://www.gsi.upm.es/ontologies/senpy/ns#", "onyx:"),
    ("http://www.gsi.upm.es/onto/senpy/ns#", "senpy:"),
    ("http://www.w3.org/ns/prov#", "prov:"),
    ("http://persistence.uni-leipzig.org/nlp2rdf/ontologies/nif-core#", "nif:"),
];

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

// A bare term, or a quoted literal (escapes allowed) with its `@lang` or
// `^^<type>` suffix.
static TERM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^"\s]\S*|"(?:[^"\\]|\\.)*"\S*"#).expect("term pattern is a valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Subject or object
    Node,
    Predicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub label: String,
    pub kind: NodeKind,
}

/// Directed edge between two node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
}

/// Node indices of one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Triple {
    pub subject: usize,
    pub predicate: usize,
    pub object: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TripleGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub triples: Vec<Triple>,
}

/// Shorten an IRI term (`<...>`) with the known prefixes and map `rdf:type`
/// to `a`. The angle brackets are dropped. Any other term is returned as-is.
pub fn rewrite_term(term: &str) -> String {
    let Some(iri) = term.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) else {
        return term.to_string();
    };
    if iri == RDF_TYPE {
        return "a".to_string();
    }
    NAMESPACES
        .iter()
        .find_map(|(namespace, prefix)| iri.strip_prefix(namespace).map(|local| format!("{prefix}{local}")))
        .unwrap_or_else(|| iri.to_string())
}

/// First three terms of a statement line, or `None` for blank, comment and
/// malformed lines.
pub fn split_statement(line: &str) -> Option<[&str; 3]> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut terms = TERM_PATTERN.find_iter(line).map(|found| found.as_str());
    let subject = terms.next()?;
    let predicate = terms.next()?;
    let object = terms.next()?;
    if object == "." {
        return None;
    }
    Some([subject, predicate, object])
}

impl TripleGraph {
    /// Build the graph for a newline-delimited N-Triples document.
    pub fn from_ntriples(text: &str) -> Self {
        let mut graph = TripleGraph::default();
        let mut resources: HashMap<String, usize> = HashMap::new();
        for [subject, predicate, object] in text.lines().filter_map(split_statement) {
            graph.add_triple(&mut resources, subject, predicate, object);
        }
        graph
    }

    fn add_triple(&mut self, resources: &mut HashMap<String, usize>, subject: &str, predicate: &str, object: &str) {
        let subject = self.resource(resources, rewrite_term(subject));
        let object = self.resource(resources, rewrite_term(object));
        let predicate = self.push_node(rewrite_term(predicate), NodeKind::Predicate);

        self.edges.push(GraphEdge {
            source: subject,
            target: predicate,
        });
        self.edges.push(GraphEdge {
            source: predicate,
            target: object,
        });
        self.triples.push(Triple {
            subject,
            predicate,
            object,
        });
    }

    fn resource(&mut self, resources: &mut HashMap<String, usize>, label: String) -> usize {
        if let Some(index) = resources.get(&label) {
            return *index;
        }
        let index = self.push_node(label.clone(), NodeKind::Node);
        resources.insert(label, index);
        index
    }

    fn push_node(&mut self, label: String, kind: NodeKind) -> usize {
        self.nodes.push(GraphNode { label, kind });
        self.nodes.len() - 1
    }

    pub fn label(&self, index: usize) -> &str {
        self.nodes.get(index).map(|node| node.label.as_str()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Statements grouped by subject label, subjects in first-seen order:
    /// `subject -> [(predicate, object)]`.
    pub fn adjacency(&self) -> IndexMap<&str, Vec<(&str, &str)>> {
        let mut listing: IndexMap<&str, Vec<(&str, &str)>> = IndexMap::new();
        for triple in &self.triples {
            listing
                .entry(self.label(triple.subject))
                .or_default()
                .push((self.label(triple.predicate), self.label(triple.object)));
        }
        listing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<http://senpy.invalid/#char=0,5> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://persistence.uni-leipzig.org/nlp2rdf/ontologies/nif-core#Context> .
<http://senpy.invalid/#char=0,5> <http://persistence.uni-leipzig.org/nlp2rdf/ontologies/nif-core#isString> "hello world"@en .

<http://senpy.invalid/#char=0,5> <http://www.gsi.upm.es/ontologies/marl/ns#hasPolarity> <http://www.gsi.upm.es/ontologies/marl/ns#Positive> .
broken line
_:b0 <http://www.w3.org/ns/prov#wasGeneratedBy> "3"^^<http://www.w3.org/2001/XMLSchema#int> .
"#;

    #[test]
    fn two_edges_per_triple_and_shared_subjects() {
        let graph = TripleGraph::from_ntriples(DOC);
        assert_eq!(graph.triples.len(), 4);
        assert_eq!(graph.edges.len(), 8);

        let subject = "http://senpy.invalid/#char=0,5";
        let subjects = graph.nodes.iter().filter(|node| node.label == subject).count();
        assert_eq!(subjects, 1);
        let predicates = graph.nodes.iter().filter(|node| node.kind == NodeKind::Predicate).count();
        assert_eq!(predicates, 4);
        for triple in &graph.triples {
            assert!(graph.edges.contains(&GraphEdge {
                source: triple.subject,
                target: triple.predicate
            }));
            assert!(graph.edges.contains(&GraphEdge {
                source: triple.predicate,
                target: triple.object
            }));
        }
    }

    #[test]
    fn iris_are_shortened_and_literals_kept() {
        let graph = TripleGraph::from_ntriples(DOC);
        let labels: Vec<&str> = graph.nodes.iter().map(|node| node.label.as_str()).collect();
        assert!(labels.contains(&"a"));
        assert!(labels.contains(&"nif:Context"));
        assert!(labels.contains(&"marl:Positive"));
        assert!(labels.contains(&"\"hello world\"@en"));
        assert!(labels.contains(&"prov:wasGeneratedBy"));
        assert!(labels.contains(&"\"3\"^^<http://www.w3.org/2001/XMLSchema#int>"));
        assert!(labels.contains(&"_:b0"));
    }

    #[test]
    fn term_rewriting() {
        assert_eq!(rewrite_term("<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>"), "a");
        assert_eq!(rewrite_term("<http://www.gsi.upm.es/ontologies/senpy/ns#Emotion>"), "onyx:Emotion");
        assert_eq!(rewrite_term("<http://www.gsi.upm.es/onto/senpy/ns#Results>"), "senpy:Results");
        assert_eq!(rewrite_term("<http://example.org/x>"), "http://example.org/x");
        assert_eq!(rewrite_term("\"plain\""), "\"plain\"");
    }

    #[test]
    fn malformed_lines_are_dropped() {
        assert!(split_statement("").is_none());
        assert!(split_statement("   ").is_none());
        assert!(split_statement("# comment").is_none());
        assert!(split_statement("<a> <b> .").is_none());
        assert_eq!(split_statement(r#"<a> <b> "say \"hi\"" ."#), Some(["<a>", "<b>", r#""say \"hi\"""#]));
        assert!(TripleGraph::from_ntriples("garbage\n\n").is_empty());
    }

    #[test]
    fn serialized_graph_lists_nodes_and_edges() {
        let graph = TripleGraph::from_ntriples(
            "<http://a> <http://www.gsi.upm.es/ontologies/marl/ns#hasPolarity> <http://www.gsi.upm.es/ontologies/marl/ns#Negative> .",
        );
        assert_eq!(
            serde_json::to_value(&graph).expect("graph json"),
            serde_json::json!({
                "nodes": [
                    { "label": "http://a", "kind": "node" },
                    { "label": "marl:Negative", "kind": "node" },
                    { "label": "marl:hasPolarity", "kind": "predicate" }
                ],
                "edges": [{ "source": 0, "target": 2 }, { "source": 2, "target": 1 }],
                "triples": [{ "subject": 0, "predicate": 2, "object": 1 }]
            })
        );
    }

    #[test]
    fn adjacency_groups_by_subject() {
        let graph = TripleGraph::from_ntriples(DOC);
        let listing = graph.adjacency();
        assert_eq!(listing.len(), 2);
        let first = &listing["http://senpy.invalid/#char=0,5"];
        assert_eq!(first[0], ("a", "nif:Context"));
        assert_eq!(first.len(), 3);
    }
}
