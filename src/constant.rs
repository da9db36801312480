/// names of values used in interactions
pub mod value {
    pub const EXPRESSION: &str = "expression";
    pub const COUNT: &str = "count";
}

/// embed accent colours, one per command
pub mod color {
    pub const ROLL: u32 = 0x5865F2;
    pub const DAMAGE: u32 = 0xFF4444;
    pub const ADVANTAGE: u32 = 0x00FF00;
    pub const DISADVANTAGE: u32 = 0xFF6600;
    pub const STATS: u32 = 0x9B59B6;
    pub const HELP: u32 = 0x5865F2;
}

/// bounds on what a single command may ask for
pub mod limits {
    pub const MAX_DICE: u32 = 100;
    pub const MAX_SIDES: u32 = 1000;
    pub const MAX_REPEAT: u32 = 20;
    /// Bound on the accumulated flat modifier. Keeps every total the
    /// aggregators compute comfortably inside `i64`.
    pub const MAX_MODIFIER: i64 = 10_000;

    /// Discord rejects embed field values longer than 1024 characters;
    /// chunk below that with some margin.
    pub const EMBED_FIELD_CHUNK: usize = 1020;
}
