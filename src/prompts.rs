pub const TINY_LESSON: &str = include_str!("../data/prompts/tiny_lesson.txt");
pub const GRAMMAR: &str = include_str!("../data/prompts/grammar.txt");
pub const SLANG_HANG: &str = include_str!("../data/prompts/slang_hang.txt");
pub const OBJECT_DESCRIPTORS: &str = include_str!("../data/prompts/object_descriptors.txt");
pub const DETECT_OBJECTS: &str = include_str!("../data/prompts/detect_objects.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
