//! Default app files rendered at server-creation time.
//!
//! Each server type gets a minimal runnable app file and a matching launch
//! command. The rendered apps read `PORT`, `HOST`, and `SERVER_NAME` from
//! the environment the supervisor injects at launch.

use crate::registry::ServerType;

/// Default app file name for templated server types.
pub const DEFAULT_APP_FILE: &str = "app.py";

/// Launch command for a server type.
///
/// `Custom` servers supply their own command; this returns `None` for them.
pub fn launch_command(server_type: ServerType, host: &str, port: u16, app_file: &str) -> Option<String> {
    match server_type {
        ServerType::Flask | ServerType::PythonHttp => Some(format!("python3 {}", app_file)),
        ServerType::Gunicorn => Some(format!(
            "gunicorn --bind {}:{} --workers 1 {}:app",
            host,
            port,
            app_file.trim_end_matches(".py")
        )),
        ServerType::Custom => None,
    }
}

/// Default app file contents for a server type.
///
/// `Custom` servers bring their own files; this returns `None` for them.
pub fn app_file_contents(server_type: ServerType, name: &str, port: u16) -> Option<String> {
    match server_type {
        ServerType::Flask => Some(flask_app(name, port)),
        ServerType::Gunicorn => Some(gunicorn_app(name)),
        ServerType::PythonHttp => Some(python_http_app(name, port)),
        ServerType::Custom => None,
    }
}

fn flask_app(name: &str, port: u16) -> String {
    format!(
        r#"from flask import Flask, jsonify
import os

app = Flask(__name__)

@app.route('/')
def home():
    return jsonify({{"message": "Flask server running!", "server": "{name}"}})

@app.route('/health')
def health():
    return jsonify({{"status": "healthy"}})

if __name__ == '__main__':
    port = int(os.environ.get('PORT', {port}))
    host = os.environ.get('HOST', '0.0.0.0')
    app.run(host=host, port=port, debug=False)
"#
    )
}

fn gunicorn_app(name: &str) -> String {
    format!(
        r#"from flask import Flask, jsonify
import os

app = Flask(__name__)

@app.route('/')
def home():
    return jsonify({{"message": "Gunicorn server running!", "server": "{name}"}})

@app.route('/health')
def health():
    return jsonify({{"status": "healthy"}})

if __name__ == '__main__':
    app.run()
"#
    )
}

fn python_http_app(name: &str, port: u16) -> String {
    format!(
        r#"import http.server
import socketserver
import os
import json

class CustomHandler(http.server.SimpleHTTPRequestHandler):
    def do_GET(self):
        if self.path == '/':
            self.send_response(200)
            self.send_header('Content-type', 'application/json')
            self.end_headers()
            response = {{"message": "Python HTTP server running!", "server": "{name}"}}
            self.wfile.write(json.dumps(response).encode())
        else:
            super().do_GET()

if __name__ == '__main__':
    port = int(os.environ.get('PORT', {port}))
    host = os.environ.get('HOST', '0.0.0.0')

    with socketserver.TCPServer((host, port), CustomHandler) as httpd:
        print(f"Server running at http://{{host}}:{{port}}")
        httpd.serve_forever()
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flask_command() {
        let cmd = launch_command(ServerType::Flask, "0.0.0.0", 9001, "app.py").unwrap();
        assert_eq!(cmd, "python3 app.py");
    }

    #[test]
    fn test_gunicorn_command_binds_host_and_port() {
        let cmd = launch_command(ServerType::Gunicorn, "127.0.0.1", 8080, "app.py").unwrap();
        assert_eq!(cmd, "gunicorn --bind 127.0.0.1:8080 --workers 1 app:app");
    }

    #[test]
    fn test_custom_has_no_template() {
        assert!(launch_command(ServerType::Custom, "0.0.0.0", 9001, "app.py").is_none());
        assert!(app_file_contents(ServerType::Custom, "alpha", 9001).is_none());
    }

    #[test]
    fn test_app_contents_mention_server_name() {
        for ty in [ServerType::Flask, ServerType::Gunicorn, ServerType::PythonHttp] {
            let contents = app_file_contents(ty, "alpha", 9001).unwrap();
            assert!(contents.contains("alpha"), "{:?} template missing name", ty);
        }
    }
}
