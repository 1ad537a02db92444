#![no_main]

use libfuzzer_sys::fuzz_target;
use markup::{EventTrace, MarkupParser, TemplateMode, TemplateModelHandler};
use text::NoCacheTextRepository;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    for mode in [TemplateMode::Html, TemplateMode::Xml] {
        let parser = MarkupParser::new(mode);
        let mut trace = EventTrace::default();
        let _ = parser.parse(input, &mut trace);

        // Without injection the model serializes back to the input.
        let mut model = TemplateModelHandler::new(NoCacheTextRepository);
        if parser.parse(input, &mut model).is_ok() {
            assert_eq!(model.into_model().to_markup(), input);
        }
    }
});
