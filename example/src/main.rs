mod templates {
    dry_eta::directory!("templates/");
    dry_eta::file!("template/card.eta");
    //language=html
    dry_eta::str!("hello_first_last", r#"
        <p>Hello <%= it.firstname %> <%= it.lastname %></p>
    "#);
}

#[cfg(test)]
mod test;

fn main() {
    for template in [templates::BUTTON, templates::BASE, templates::CARD, templates::HELLO_FIRST_LAST] {
        println!("// {}", template.name);
        println!("{}\n", template.function);
    }
}
