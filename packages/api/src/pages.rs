//! Fixed HTML pages. Templating is left to whatever sits in front of the gateway.

pub const INDEX: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Gateway</title></head>
  <body>
    <h1>Welcome</h1>
    <p><a href="/login">Log in</a> | <a href="/restricted">Restricted area</a></p>
  </body>
</html>
"#;

pub const LOGIN: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Log in</title></head>
  <body>
    <h1>Log in</h1>
    <form id="login">
      <input name="name" placeholder="name">
      <input name="password" type="password" placeholder="password">
      <button type="submit">Log in</button>
    </form>
    <p><a href="/login/google">Log in with Google</a></p>
    <script>
      document.getElementById('login').addEventListener('submit', async (event) => {
        event.preventDefault();
        const form = new FormData(event.target);
        const response = await fetch('/api/sessions', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ name: form.get('name'), password: form.get('password') }),
        });
        if (response.ok) window.location = '/';
      });
    </script>
  </body>
</html>
"#;

pub const RESTRICTED: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Restricted</title></head>
  <body>
    <h1>Restricted</h1>
    <p>You are logged in.</p>
  </body>
</html>
"#;
