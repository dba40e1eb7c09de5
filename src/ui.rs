use crate::catalog;

pub fn render_index() -> String {
    let moods = serde_json::to_string(catalog::all()).unwrap_or_else(|_| "[]".to_string());
    INDEX_HTML.replace("{{MOODS}}", &moods)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>MoodFlow</title>
  <style>
    :root {
      --bg: #f9fafb;
      --card: #ffffff;
      --ink: #1f2937;
      --muted: #6b7280;
      --accent: #8b5cf6;
      --accent-2: #3b82f6;
      --danger: #dc2626;
      --ok: #16a34a;
      --line: rgba(31, 41, 55, 0.1);
      --shadow: 0 24px 60px rgba(76, 29, 149, 0.14);
    }

    html.dark {
      --bg: #111827;
      --card: #1f2937;
      --ink: #f3f4f6;
      --muted: #9ca3af;
      --line: rgba(243, 244, 246, 0.12);
      --shadow: 0 24px 60px rgba(0, 0, 0, 0.4);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: system-ui, "Segoe UI", sans-serif;
      transition: background 200ms ease, color 200ms ease;
    }

    h1 {
      margin: 0;
      font-size: clamp(2.2rem, 5vw, 3.4rem);
      background: linear-gradient(90deg, var(--accent), var(--accent-2));
      -webkit-background-clip: text;
      background-clip: text;
      color: transparent;
    }

    h2 {
      margin: 0 0 16px;
      font-size: 1.4rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 12px;
      padding: 12px 18px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      color: white;
      background: var(--accent);
      transition: transform 150ms ease, opacity 150ms ease;
    }

    button:active {
      transform: scale(0.98);
    }

    button:disabled {
      opacity: 0.4;
      cursor: not-allowed;
    }

    button.secondary {
      background: transparent;
      color: var(--accent);
      padding: 8px 0;
    }

    button.green {
      background: var(--ok);
    }

    button.red {
      background: var(--danger);
    }

    input,
    textarea {
      width: 100%;
      padding: 14px;
      border-radius: 12px;
      border: 2px solid var(--line);
      background: transparent;
      color: var(--ink);
      font: inherit;
    }

    .hidden {
      display: none !important;
    }

    .card {
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 28px;
    }

    #auth {
      min-height: 100vh;
      display: grid;
      place-items: center;
      padding: 16px;
      background: linear-gradient(135deg, var(--accent), var(--accent-2));
    }

    #auth .card {
      width: min(420px, 100%);
      display: grid;
      gap: 16px;
      text-align: center;
    }

    #auth form {
      display: grid;
      gap: 14px;
    }

    #app {
      max-width: 1200px;
      margin: 0 auto;
      padding: 24px;
      display: grid;
      gap: 24px;
    }

    .topbar {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: center;
      gap: 16px;
    }

    .topbar .actions {
      display: flex;
      gap: 10px;
      flex-wrap: wrap;
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: var(--line);
      border-radius: 999px;
      width: fit-content;
    }

    .tab {
      background: transparent;
      color: var(--muted);
      border-radius: 999px;
      padding: 8px 16px;
    }

    .tab.active {
      background: var(--card);
      color: var(--accent);
    }

    .editor {
      display: grid;
      gap: 20px;
      text-align: center;
      max-width: 760px;
      margin: 0 auto;
      width: 100%;
    }

    .moods {
      display: flex;
      justify-content: center;
      gap: 18px;
      flex-wrap: wrap;
    }

    .mood {
      background: transparent;
      font-size: 3.4rem;
      padding: 6px;
      border-radius: 20px;
      border: 3px solid transparent;
      transition: transform 150ms ease;
    }

    .mood:hover,
    .mood.selected {
      transform: scale(1.2);
    }

    .mood.selected {
      border-color: var(--accent);
    }

    .editor .row {
      display: flex;
      gap: 12px;
      justify-content: center;
      flex-wrap: wrap;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
      gap: 24px;
    }

    .calendar {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
      text-align: center;
    }

    .calendar .weekday {
      font-size: 0.8rem;
      font-weight: 700;
      color: var(--muted);
    }

    .cell {
      aspect-ratio: 1;
      border-radius: 10px;
      display: flex;
      align-items: center;
      justify-content: center;
      font-weight: 700;
      color: #374151;
      cursor: pointer;
      border: 2px solid transparent;
      padding: 0;
    }

    .cell.filled {
      color: white;
    }

    .cell.today {
      border-color: var(--accent);
    }

    .cell.locked {
      opacity: 0.35;
      cursor: not-allowed;
    }

    .today-card .glyph {
      font-size: 4rem;
    }

    .today-card p {
      font-size: 1.2rem;
      color: var(--muted);
    }

    svg {
      width: 100%;
      display: block;
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .chart-grid {
      stroke: var(--line);
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-point {
      fill: var(--card);
      stroke: var(--accent);
      stroke-width: 2;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      font-size: 0.9rem;
      margin-top: 12px;
    }

    .legend span::before {
      content: "";
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      margin-right: 6px;
      background: var(--dot);
    }

    .status {
      min-height: 1.4em;
      font-size: 0.95rem;
      color: var(--muted);
    }

    .status[data-type="error"] {
      color: var(--danger);
    }

    .status[data-type="info"] {
      color: var(--ok);
    }

    #confetti {
      position: fixed;
      inset: 0;
      pointer-events: none;
      overflow: hidden;
      z-index: 50;
    }

    #confetti i {
      position: absolute;
      top: -20px;
      width: 10px;
      height: 16px;
      border-radius: 3px;
      animation: fall linear forwards;
    }

    @keyframes fall {
      to {
        transform: translateY(110vh) rotate(720deg);
      }
    }
  </style>
</head>
<body>
  <section id="auth">
    <div class="card">
      <h1>MoodFlow</h1>
      <form id="auth-form">
        <input id="email" type="email" placeholder="Email" autocomplete="email" required />
        <input id="password" type="password" placeholder="Password" autocomplete="current-password" required />
        <button id="auth-submit" type="submit">Sign in</button>
      </form>
      <div class="status" id="auth-status"></div>
      <button class="secondary" id="auth-toggle" type="button">Create an account</button>
    </div>
  </section>

  <main id="app" class="hidden">
    <div class="topbar">
      <h1>MoodFlow</h1>
      <div class="actions">
        <button id="theme" type="button">Dark mode</button>
        <button id="report" class="green" type="button">Download report</button>
        <button id="sign-out" class="red" type="button">Sign out</button>
      </div>
    </div>

    <div class="tabs" role="tablist">
      <button class="tab" type="button" data-view="entry" role="tab">Log mood</button>
      <button class="tab" type="button" data-view="calendar" role="tab">Calendar &amp; charts</button>
    </div>

    <div class="status" id="status"></div>

    <section id="view-entry" class="card editor">
      <h2 id="greeting">How are you today?</h2>
      <div class="row">
        <input id="entry-date" type="date" style="max-width: 220px" />
      </div>
      <div class="moods" id="moods"></div>
      <textarea id="note" rows="4" placeholder="Why do you feel this way? (optional)"></textarea>
      <div class="row">
        <button id="save" type="button" disabled>Save mood</button>
        <button id="delete" class="red hidden" type="button">Delete entry</button>
      </div>
    </section>

    <section id="view-calendar" class="hidden">
      <div class="grid">
        <div class="card">
          <h2>Mood calendar</h2>
          <div class="calendar" id="calendar"></div>
        </div>
        <div class="card">
          <h2>All-time moods</h2>
          <svg id="pie" viewBox="0 0 220 220" role="img" aria-label="Mood distribution"></svg>
          <div class="legend" id="legend"></div>
        </div>
        <div class="card today-card">
          <h2>Today</h2>
          <div class="glyph" id="today-glyph">–</div>
          <p id="today-note">No entry yet.</p>
        </div>
      </div>
      <div class="card" style="margin-top: 24px">
        <h2>Mood trend</h2>
        <svg id="trend" viewBox="0 0 600 240" role="img" aria-label="Mood trend"></svg>
      </div>
    </section>
  </main>

  <div id="confetti"></div>

  <script>
    const MOODS = {{MOODS}};
    const TOKEN_KEY = 'moodflow-token';
    const THEME_KEY = 'moodflow-theme';
    const WEEKDAYS = ['Mon', 'Tue', 'Wed', 'Thu', 'Fri', 'Sat', 'Sun'];

    const $ = (id) => document.getElementById(id);
    const moodOf = (value) => MOODS.find((mood) => mood.value === value);

    let socket = null;
    let signUpMode = false;
    let restoring = false;
    let session = null;
    let editor = null;
    let views = null;
    let records = {};
    let selectedMood = null;
    let activeView = 'entry';

    const setStatus = (el, message, type) => {
      el.textContent = message || '';
      el.dataset.type = type || '';
    };

    const send = (message) => {
      if (socket && socket.readyState === WebSocket.OPEN) {
        socket.send(JSON.stringify(message));
      } else {
        setStatus($('status'), 'Not connected, retrying…', 'error');
      }
    };

    const applyTheme = (dark) => {
      document.documentElement.classList.toggle('dark', dark);
      $('theme').textContent = dark ? 'Light mode' : 'Dark mode';
      localStorage.setItem(THEME_KEY, dark ? 'dark' : 'light');
    };

    const setView = (view) => {
      activeView = view;
      $('view-entry').classList.toggle('hidden', view !== 'entry');
      $('view-calendar').classList.toggle('hidden', view !== 'calendar');
      document.querySelectorAll('.tab').forEach((tab) => {
        tab.classList.toggle('active', tab.dataset.view === view);
      });
    };

    const renderSession = (message) => {
      session = message.phase === 'authenticated' ? message : null;
      $('auth').classList.toggle('hidden', !!session);
      $('app').classList.toggle('hidden', !session);
      $('auth-submit').disabled = message.phase === 'authenticating';

      if (session) {
        localStorage.setItem(TOKEN_KEY, session.token);
        $('greeting').textContent = `How are you today, ${session.display_name}?`;
        setStatus($('auth-status'), '');
      } else {
        if (restoring) {
          localStorage.removeItem(TOKEN_KEY);
        }
        setStatus($('auth-status'), message.error, 'error');
      }
      restoring = false;
    };

    const recordFor = (date) => records[date] || null;

    const loadRecords = async () => {
      if (!session) {
        return;
      }
      const res = await fetch('/api/moods', {
        headers: { authorization: `Bearer ${session.token}` }
      });
      if (res.ok) {
        records = await res.json();
        syncDeleteButton();
      }
    };

    const syncDeleteButton = () => {
      $('delete').classList.toggle('hidden', !recordFor($('entry-date').value));
    };

    const renderMoodButtons = () => {
      const container = $('moods');
      container.innerHTML = '';
      MOODS.forEach((mood) => {
        const button = document.createElement('button');
        button.type = 'button';
        button.className = 'mood' + (selectedMood === mood.value ? ' selected' : '');
        button.textContent = mood.glyph;
        button.title = mood.label;
        button.addEventListener('click', () => {
          selectedMood = mood.value;
          renderMoodButtons();
        });
        container.appendChild(button);
      });
      $('save').disabled = selectedMood === null;
    };

    const renderEditor = (message) => {
      editor = message;
      selectedMood = message.mood;
      $('entry-date').value = message.date;
      $('entry-date').max = message.max_date;
      $('note').value = message.note;
      renderMoodButtons();
      syncDeleteButton();
      setView(message.view);
    };

    const loadDate = (date) => {
      const record = recordFor(date);
      $('entry-date').value = date;
      selectedMood = record && record.mood ? record.mood : null;
      $('note').value = record && record.note ? record.note : '';
      renderMoodButtons();
      syncDeleteButton();
      setView('entry');
    };

    const renderCalendar = () => {
      const container = $('calendar');
      container.innerHTML = WEEKDAYS.map((day) => `<div class="weekday">${day}</div>`).join('');
      views.calendar.forEach((cell) => {
        const el = document.createElement('button');
        el.type = 'button';
        el.className = 'cell';
        el.style.backgroundColor = cell.color;
        el.textContent = cell.day;
        el.title = cell.record
          ? `${cell.date}: ${moodOf(cell.record.mood).label}${cell.record.note ? ' – ' + cell.record.note : ''}`
          : cell.date;
        if (cell.record) el.classList.add('filled');
        if (cell.is_today) el.classList.add('today');
        if (cell.is_future) {
          el.classList.add('locked');
          el.disabled = true;
        } else {
          el.addEventListener('click', () => loadDate(cell.date));
        }
        container.appendChild(el);
      });
    };

    const renderPie = () => {
      const svg = $('pie');
      const total = views.distribution.reduce((sum, slice) => sum + slice.count, 0);
      if (!total) {
        svg.innerHTML = '<text class="chart-label" x="110" y="110" text-anchor="middle">No data yet</text>';
        $('legend').innerHTML = '';
        return;
      }
      const cx = 110;
      const cy = 110;
      const r = 100;
      let angle = -Math.PI / 2;
      let paths = '';
      views.distribution.forEach((slice) => {
        if (!slice.count) {
          return;
        }
        if (slice.count === total) {
          paths += `<circle cx="${cx}" cy="${cy}" r="${r}" fill="${slice.color}" />`;
          return;
        }
        const sweep = (slice.count / total) * Math.PI * 2;
        const x1 = cx + r * Math.cos(angle);
        const y1 = cy + r * Math.sin(angle);
        angle += sweep;
        const x2 = cx + r * Math.cos(angle);
        const y2 = cy + r * Math.sin(angle);
        const large = sweep > Math.PI ? 1 : 0;
        paths += `<path d="M ${cx} ${cy} L ${x1.toFixed(2)} ${y1.toFixed(2)} A ${r} ${r} 0 ${large} 1 ${x2.toFixed(2)} ${y2.toFixed(2)} Z" fill="${slice.color}" />`;
      });
      svg.innerHTML = paths;
      $('legend').innerHTML = views.distribution
        .map((slice) => `<span style="--dot:${slice.color}">${slice.glyph} ${slice.label}: ${slice.count}</span>`)
        .join('');
    };

    const renderTrend = () => {
      const svg = $('trend');
      const points = views.trend;
      if (!points.length) {
        svg.innerHTML = '<text class="chart-label" x="300" y="120" text-anchor="middle">No data yet</text>';
        return;
      }
      const width = 600;
      const height = 240;
      const padX = 44;
      const padY = 34;
      const top = 20;
      const step = points.length > 1 ? (width - padX * 2) / (points.length - 1) : 0;
      const x = (index) => padX + index * step;
      const y = (mood) => height - padY - ((mood - 1) / 4) * (height - top - padY);

      let grid = '';
      MOODS.forEach((mood) => {
        grid += `<line class="chart-grid" x1="${padX}" y1="${y(mood.value)}" x2="${width - padX}" y2="${y(mood.value)}" />`;
        grid += `<text class="chart-label" x="${padX - 10}" y="${y(mood.value) + 4}" text-anchor="end">${mood.glyph}</text>`;
      });
      const path = points
        .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(point.mood).toFixed(2)}`)
        .join(' ');
      const dots = points
        .map((point, index) => `<circle class="chart-point" cx="${x(index)}" cy="${y(point.mood)}" r="5" />`)
        .join('');
      const labelEvery = Math.ceil(points.length / 8);
      const labels = points
        .map((point, index) => index % labelEvery === 0
          ? `<text class="chart-label" x="${x(index)}" y="${height - padY + 18}" text-anchor="middle">${point.date.slice(5)}</text>`
          : '')
        .join('');
      svg.innerHTML = `${grid}<path class="chart-line" d="${path}" />${dots}${labels}`;
    };

    const renderToday = () => {
      const record = views.today_record;
      if (record) {
        const mood = moodOf(record.mood);
        $('today-glyph').textContent = mood.glyph;
        $('today-note').textContent = record.note || 'No note';
      } else {
        $('today-glyph').textContent = '–';
        $('today-note').textContent = 'No entry yet.';
      }
    };

    const celebrate = (duration) => {
      const layer = $('confetti');
      layer.innerHTML = '';
      for (let i = 0; i < 140; i += 1) {
        const piece = document.createElement('i');
        piece.style.left = `${Math.random() * 100}%`;
        piece.style.background = MOODS[i % MOODS.length].color;
        piece.style.animationDuration = `${2 + Math.random() * 3}s`;
        piece.style.animationDelay = `${Math.random() * (duration / 1000 - 5)}s`;
        layer.appendChild(piece);
      }
      setTimeout(() => {
        layer.innerHTML = '';
      }, duration);
    };

    const renderViews = (message) => {
      views = message;
      records = {};
      views.calendar.forEach((cell) => {
        if (cell.record) {
          records[cell.date] = cell.record;
        }
      });
      loadRecords().catch(() => {});
      renderCalendar();
      renderPie();
      renderTrend();
      renderToday();
      syncDeleteButton();
      if (views.celebration) {
        celebrate(views.celebration.duration_ms);
      }
    };

    const onMessage = (event) => {
      const message = JSON.parse(event.data);
      switch (message.type) {
        case 'session':
          renderSession(message);
          break;
        case 'editor':
          renderEditor(message);
          break;
        case 'views':
          renderViews(message);
          break;
        case 'notice':
          setStatus($('status'), message.message, message.level);
          if (message.level === 'info') {
            setTimeout(() => setStatus($('status'), ''), 2500);
          }
          break;
        default:
          break;
      }
    };

    const connect = () => {
      const scheme = location.protocol === 'https:' ? 'wss' : 'ws';
      socket = new WebSocket(`${scheme}://${location.host}/api/ws`);
      socket.addEventListener('message', onMessage);
      socket.addEventListener('open', () => {
        setStatus($('status'), '');
        const token = localStorage.getItem(TOKEN_KEY);
        if (token) {
          restoring = true;
          send({ type: 'restore', token });
        }
      });
      socket.addEventListener('close', () => {
        setStatus($('status'), 'Connection lost, reconnecting…', 'error');
        setTimeout(connect, 2000);
      });
    };

    $('auth-form').addEventListener('submit', (event) => {
      event.preventDefault();
      send({
        type: signUpMode ? 'sign_up' : 'sign_in',
        email: $('email').value,
        password: $('password').value
      });
    });

    $('auth-toggle').addEventListener('click', () => {
      signUpMode = !signUpMode;
      $('auth-submit').textContent = signUpMode ? 'Create account' : 'Sign in';
      $('auth-toggle').textContent = signUpMode ? 'I already have an account' : 'Create an account';
      $('password').autocomplete = signUpMode ? 'new-password' : 'current-password';
    });

    $('save').addEventListener('click', () => {
      send({
        type: 'submit',
        date: $('entry-date').value,
        mood: selectedMood,
        note: $('note').value
      });
    });

    $('delete').addEventListener('click', () => {
      const date = $('entry-date').value;
      send({
        type: 'delete',
        date,
        confirmed: window.confirm(`Delete your entry for ${date}?`)
      });
    });

    $('entry-date').addEventListener('change', () => loadDate($('entry-date').value));

    $('sign-out').addEventListener('click', () => {
      localStorage.removeItem(TOKEN_KEY);
      send({ type: 'sign_out' });
    });

    $('theme').addEventListener('click', () => {
      applyTheme(!document.documentElement.classList.contains('dark'));
    });

    $('report').addEventListener('click', async () => {
      if (!session) {
        return;
      }
      try {
        const res = await fetch('/api/report', {
          headers: { authorization: `Bearer ${session.token}` }
        });
        if (!res.ok) {
          throw new Error('Unable to build the report');
        }
        const disposition = res.headers.get('content-disposition') || '';
        const match = disposition.match(/filename="([^"]+)"/);
        const link = document.createElement('a');
        link.href = URL.createObjectURL(await res.blob());
        link.download = match ? match[1] : 'MoodFlow-report.txt';
        link.click();
        URL.revokeObjectURL(link.href);
      } catch (err) {
        setStatus($('status'), err.message, 'error');
      }
    });

    document.querySelectorAll('.tab').forEach((tab) => {
      tab.addEventListener('click', () => setView(tab.dataset.view));
    });

    applyTheme(localStorage.getItem(THEME_KEY) === 'dark');
    setView(activeView);
    renderMoodButtons();
    connect();
  </script>
</body>
</html>
"##;
