#![no_main]

use libfuzzer_sys::fuzz_target;

use kasm_visit::encoder::ModuleWriter;
use kasm_visit::parser::{self, events::EventRecorder};
use kasm_visit::validate;

fuzz_target!(|data: &[u8]| {
    // We don't care about the result - we're looking for panics/crashes
    let _ = validate::validate(data);

    let mut recorder = EventRecorder::new();
    if parser::read(data, &mut recorder).is_err() {
        return;
    }
    // anything that reads must write back to something that reads the same
    let mut writer = ModuleWriter::new();
    parser::read(data, &mut writer).expect("second read");
    let written = writer.finish().expect("write");
    let mut again = EventRecorder::new();
    parser::read(&written, &mut again).expect("reread");
    assert_eq!(again.events(), recorder.events());
});
