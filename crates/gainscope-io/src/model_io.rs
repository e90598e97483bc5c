use crate::error::IoResult;
use gainscope_nn::Mlp;
use std::fs;
use std::path::Path;
use tracing::info;

/// Save a trained network (weights, activations, cost) to a JSON file.
pub fn save_model<P: AsRef<Path>>(model: &Mlp, path: P) -> IoResult<()> {
    let json = serde_json::to_string_pretty(model)?;
    fs::write(path.as_ref(), json)?;
    info!(path = %path.as_ref().display(), nodes = ?model.nodes(), "saved model");
    Ok(())
}

/// Load a network saved by [`save_model`].
///
/// Weight shapes and layer chaining are checked while parsing, so a
/// malformed file is an error rather than a network that fails later.
pub fn load_model<P: AsRef<Path>>(path: P) -> IoResult<Mlp> {
    let json = fs::read_to_string(path.as_ref())?;
    let model: Mlp = serde_json::from_str(&json)?;
    Ok(model)
}
