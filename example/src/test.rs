#[cfg(test)]
mod tests {
    use crate::templates;

    #[test]
    fn directory_templates() {
        assert_eq!(templates::BUTTON.name, "button");
        assert!(templates::BUTTON.body.contains("layout('./base', { title: it.label })\n"));
        assert!(templates::BUTTON.body.contains("__eta.res+=__eta.e(it.id)\n"));
        assert_eq!(templates::BASE.name, "base");
        assert!(templates::BASE.body.contains("__eta.res+=it.body\n"));
    }

    #[test]
    fn slurped_card() {
        assert!(templates::CARD.body.contains(
            "__eta.res+='<div class=\"card\">'\nif (it.user) {\n__eta.res+='<h2>'\n"
        ));
        assert!(templates::CARD.body.contains("} else {\n__eta.res+='<h2>Anonymous</h2>'\n}\n__eta.res+='</div>\\n'\n"));
    }

    #[test]
    fn inline_template() {
        assert!(templates::HELLO_FIRST_LAST.function.starts_with("function anonymous(it, options) {"));
    }
}
