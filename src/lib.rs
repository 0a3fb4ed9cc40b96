//! Crate root module declarations for the Plum Search engine project.
//!
//! Exposes the rules adapter, the search core, the engine wrapper and the UCI
//! front-end so the binary, benches and external tooling can import stable
//! module paths.

pub mod errors;

pub mod rules {
    pub mod chess_position;
    pub mod search_position;
}

pub mod search {
    pub mod alpha_beta;
    pub mod board_scoring;
    pub mod iterative_deepening;
    pub mod move_ordering;
    pub mod quiescence;
    pub mod search_context;
    #[cfg(test)]
    pub mod test_tree;
    pub mod time_governor;
    pub mod transposition_table;
}

pub mod engines {
    pub mod engine_iterative;
    pub mod engine_trait;
    pub mod time_management;
}

pub mod uci {
    pub mod uci_top;
}
