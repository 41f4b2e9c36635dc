use std::collections::HashMap;

use color_eyre::eyre::{eyre, Result};
use eframe::{run_native, App, CreationContext, NativeOptions};
use egui::Color32;
use egui_graphs::{
    DefaultGraphView, Graph, SettingsInteraction, SettingsNavigation, SettingsStyle,
};
use petgraph::{graph::EdgeIndex, graph::NodeIndex, prelude::StableGraph};
use tracing::info;

use crate::fa::{labelled_edges, FA};

struct Visualizer {
    graph: Graph,
}

impl Visualizer {
    fn new(_: &CreationContext<'_>, graph: Graph) -> Self {
        Visualizer { graph }
    }
}

impl App for Visualizer {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let navigation_settings = &SettingsNavigation::new()
                .with_zoom_and_pan_enabled(true)
                .with_fit_to_screen_enabled(true);
            let interactive_settings = &SettingsInteraction::new()
                .with_dragging_enabled(true)
                .with_node_clicking_enabled(true)
                .with_node_selection_enabled(true)
                .with_node_selection_multi_enabled(true)
                .with_edge_clicking_enabled(true)
                .with_edge_selection_enabled(true)
                .with_edge_selection_multi_enabled(true);
            let style_settings = &SettingsStyle::default().with_labels_always(true);
            ui.add(
                &mut DefaultGraphView::new(&mut self.graph)
                    .with_styles(style_settings)
                    .with_interactions(interactive_settings)
                    .with_navigations(navigation_settings),
            );
        });
    }
}

fn generate_stable_graph<T: FA>(fa: &T) -> Graph {
    let mut stable_graph = StableGraph::new();

    let start_node_color = Color32::from_rgb(20, 67, 130);
    let accept_node_color = Color32::from_rgb(20, 130, 90);

    // NFA ids may start at 1, graph nodes always start at 0
    let mut node_map: HashMap<usize, NodeIndex> = HashMap::new();
    for state_id in fa.get_state_ids() {
        node_map.insert(state_id, stable_graph.add_node(()));
    }

    let mut edge_labels: Vec<(EdgeIndex, String)> = Vec::new();
    for (from, to, label) in labelled_edges(fa) {
        let edge_idx = stable_graph.add_edge(node_map[&from], node_map[&to], ());
        edge_labels.push((edge_idx, label));
    }

    let mut graph = Graph::from(&stable_graph);

    for state_id in fa.get_state_ids() {
        if let Some(node) = graph.node_mut(node_map[&state_id]) {
            node.set_label(format!("State {}", state_id));
            if fa.is_accept_state(state_id) {
                node.set_color(accept_node_color);
            } else if state_id == fa.get_start_state() {
                node.set_color(start_node_color);
            }
        }
    }

    for (edge_idx, label) in edge_labels {
        if let Some(edge) = graph.edge_mut(edge_idx) {
            edge.set_label(label);
        }
    }

    graph
}

/// Opens a window showing the finite automaton provided. Blocks until the window is closed.
pub fn visualize<T: FA>(fa: &T) -> Result<()> {
    let graph = generate_stable_graph(fa);
    info!(states = fa.get_num_states(), "opening visualizer");
    run_native(
        "finite automata visualizer",
        NativeOptions::default(),
        Box::new(|cc| Ok(Box::new(Visualizer::new(cc, graph)))),
    )
    .map_err(|err| eyre!("Failed to open the visualizer: {}", err))
}
