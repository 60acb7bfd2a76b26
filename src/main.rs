use nu_plugin::{serve_plugin, MsgPackSerializer};
use nu_plugin_keyphrase::KeyphrasePlugin;

fn main() {
    serve_plugin(&KeyphrasePlugin, MsgPackSerializer {})
}
