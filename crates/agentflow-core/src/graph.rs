// SPDX-License-Identifier: MIT
use serde::Serialize;
use serde_json::json;

/// A node in the static workflow graph. Carries no runtime state — purely
/// descriptive, for export tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Start,
    End,
    Step,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
}

/// The compiled workflow's static shape: nodes and directed edges,
/// including the synthetic `__start__`/`__end__` sentinels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSpec {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<(String, String)>,
}

/// Enumerate nodes/edges for the current workflow shape. `has_tools`
/// mirrors whether the tool catalog is non-empty — `call_tools` only
/// appears in the graph when it does.
pub fn build_graph(has_tools: bool) -> GraphSpec {
    let mut nodes = vec![
        GraphNode { id: "__start__".into(), kind: NodeKind::Start },
        GraphNode { id: "process_input".into(), kind: NodeKind::Step },
        GraphNode { id: "generate_response".into(), kind: NodeKind::Step },
    ];
    if has_tools {
        nodes.push(GraphNode { id: "call_tools".into(), kind: NodeKind::Step });
    }
    nodes.push(GraphNode { id: "format_output".into(), kind: NodeKind::Step });
    nodes.push(GraphNode { id: "__end__".into(), kind: NodeKind::End });

    let mut edges = vec![
        ("__start__".to_string(), "process_input".to_string()),
        ("process_input".to_string(), "generate_response".to_string()),
    ];
    if has_tools {
        edges.push(("generate_response".to_string(), "call_tools".to_string()));
        edges.push(("call_tools".to_string(), "generate_response".to_string()));
    }
    edges.push(("generate_response".to_string(), "format_output".to_string()));
    edges.push(("format_output".to_string(), "__end__".to_string()));

    GraphSpec { nodes, edges }
}

fn node_label(id: &str) -> String {
    match id {
        "__start__" => "Start".to_string(),
        "__end__" => "End".to_string(),
        other => other
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn mermaid_node_decl(node: &GraphNode) -> String {
    let label = node_label(&node.id);
    match node.kind {
        NodeKind::Start | NodeKind::End => format!("    {}(({label}))", node.id),
        NodeKind::Step => format!("    {}[{label}]", node.id),
    }
}

/// Render the graph as a Mermaid `graph TD` block. `description`,
/// when present, is appended as a trailing prose section.
pub fn to_mermaid(graph: &GraphSpec, description: Option<&str>) -> String {
    let mut out = String::from("```mermaid\ngraph TD\n");
    for node in &graph.nodes {
        out.push_str(&mermaid_node_decl(node));
        out.push('\n');
    }
    for (source, target) in &graph.edges {
        out.push_str(&format!("    {source} --> {target}\n"));
    }

    out.push_str("    classDef startEnd fill:#d4edda,stroke:#28a745,stroke-width:2px;\n");
    out.push_str("    classDef step fill:#e2e8f0,stroke:#475569,stroke-width:1px;\n");

    let sentinel_ids: Vec<&str> = graph
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Start | NodeKind::End))
        .map(|n| n.id.as_str())
        .collect();
    if !sentinel_ids.is_empty() {
        out.push_str(&format!("    class {} startEnd\n", sentinel_ids.join(",")));
    }
    let step_ids: Vec<&str> = graph
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Step))
        .map(|n| n.id.as_str())
        .collect();
    if !step_ids.is_empty() {
        out.push_str(&format!("    class {} step\n", step_ids.join(",")));
    }
    out.push_str("```\n");

    if let Some(desc) = description {
        out.push('\n');
        out.push_str(desc.trim());
        out.push('\n');
    }
    out
}

/// Metadata about one catalog tool, for the JSON export's `tools` array.
#[derive(Debug, Clone, Serialize)]
pub struct GraphToolInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub origin: String,
}

fn node_type_str(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Start => "start",
        NodeKind::End => "end",
        NodeKind::Step => "step",
    }
}

/// Render the graph as a JSON document shaped
/// `{nodes, edges, tools, workflow, description}`.
pub fn to_json(graph: &GraphSpec, tools: &[GraphToolInfo], workflow_name: &str, description: &str) -> serde_json::Value {
    let nodes: Vec<_> = graph
        .nodes
        .iter()
        .map(|n| json!({ "id": n.id, "type": node_type_str(&n.kind), "label": node_label(&n.id) }))
        .collect();
    let edges: Vec<_> = graph
        .edges
        .iter()
        .map(|(source, target)| json!({ "source": source, "target": target }))
        .collect();

    json!({
        "nodes": nodes,
        "edges": edges,
        "tools": tools,
        "workflow": workflow_name,
        "description": description,
    })
}
