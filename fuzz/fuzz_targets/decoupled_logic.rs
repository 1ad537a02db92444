#![no_main]

use libfuzzer_sys::fuzz_target;
use markup::{MarkupTemplateParser, ParserConfig, TemplateMode, parse_decoupled_logic};
use std::sync::Arc;
use text::LimitedSizeCacheTextRepository;

const TEMPLATE: &str = "<html><body><form id=f><input name=q><br/></form>\
<ul><li>a</li><li class=x>b</li></ul></body></html>";

fuzz_target!(|data: &[u8]| {
    let Ok(logic) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(logic) = parse_decoupled_logic("fuzz.th.xml", logic, TemplateMode::Xml) else {
        return;
    };
    let repository = LimitedSizeCacheTextRepository::new(64, &["html", "body"]);
    let parser = MarkupTemplateParser::new(ParserConfig::default(), repository);
    let _ = parser.parse(TEMPLATE, Some(&Arc::new(logic)));
    assert!(parser.repository().stats().size_in_chars <= 64);
});
